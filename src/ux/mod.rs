use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};
use std::time::Duration;

use crate::profile::{FieldKind, FieldSpec, FieldValue, FormSpec, FormSubmission};
use crate::view::{Banner, Block, Screen, Tone};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Line-oriented terminal front end. Reads answers from `input` and paints
/// to `out`; end of input surfaces as `UnexpectedEof`.
pub struct Terminal<R, W> {
    input: R,
    out: W,
    tty: bool,
}

impl Terminal<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let tty = io::stdin().is_terminal() && io::stdout().is_terminal();
        Self { input: io::stdin().lock(), out: io::stdout(), tty }
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    #[cfg(test)]
    pub fn new(input: R, out: W) -> Self {
        Self { input, out, tty: false }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn paint(&mut self, screen: &Screen) -> io::Result<()> {
        writeln!(self.out, "\n{}", RULE.bold())?;
        writeln!(self.out, "  {}", screen.title.bold())?;
        if let Some(sub) = &screen.subtitle {
            writeln!(self.out, "  {}", sub.dimmed())?;
        }
        writeln!(self.out, "{}", RULE.bold())?;
        if let Some(Banner { tone, text }) = &screen.banner {
            self.message(*tone, text)?;
        }
        for block in &screen.blocks {
            self.block(block)?;
        }
        self.out.flush()
    }

    fn block(&mut self, block: &Block) -> io::Result<()> {
        match block {
            Block::Heading(h) => writeln!(self.out, "\n{}", h.cyan().bold()),
            Block::Paragraph(p) => writeln!(self.out, "{p}"),
            Block::Bullets(items) => {
                for item in items {
                    writeln!(self.out, "  • {item}")?;
                }
                Ok(())
            }
            Block::Metric { label, value } => writeln!(self.out, "  {}: {}", label.bold(), value),
            Block::Gauge { label, current, goal, unit } => writeln!(
                self.out,
                "  {}: {} {}/{} {} ({}%)",
                label.bold(),
                gauge_bar(*current, *goal, 20),
                current,
                goal,
                unit,
                percent(*current, *goal)
            ),
            Block::Plan { title, generated_at, body } => {
                writeln!(self.out, "\n{}", title.green().bold())?;
                writeln!(self.out, "{}", format!("Generated on: {generated_at}").dimmed())?;
                writeln!(self.out, "\n{}\n", body.trim())?;
                writeln!(self.out, "{}", "---".dimmed())
            }
            Block::Tips { title, items } => {
                writeln!(self.out, "\n{}", title.yellow().bold())?;
                for (i, t) in items.iter().enumerate() {
                    writeln!(self.out, "  {}. {t}", i + 1)?;
                }
                Ok(())
            }
        }
    }

    pub fn message(&mut self, tone: Tone, text: &str) -> io::Result<()> {
        let line = match tone {
            Tone::Info => format!("ℹ {text}").blue(),
            Tone::Success => format!("✔ {text}").green(),
            Tone::Warning => format!("⚠ {text}").yellow(),
            Tone::Error => format!("✖ {text}").red().bold(),
        };
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// One trimmed line of input.
    pub fn ask_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut s = String::new();
        if self.input.read_line(&mut s)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(s.trim().to_string())
    }

    /// Whole number in `min..=max`; blank keeps `current`. Re-asks on bad input.
    pub fn ask_int(&mut self, label: &str, min: i64, max: i64, current: i64) -> io::Result<i64> {
        loop {
            let s = self.ask_line(&format!("{} [{min}-{max}] ({current}): ", label.bold()))?;
            if s.is_empty() {
                return Ok(current);
            }
            match s.parse::<i64>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(n),
                _ => {
                    let msg = format!("{label} must be a whole number between {min} and {max}.");
                    self.message(Tone::Warning, &msg)?
                }
            }
        }
    }

    /// Decimal number in `min..=max`; blank keeps `current`.
    pub fn ask_float(&mut self, label: &str, min: f64, max: f64, current: f64) -> io::Result<f64> {
        loop {
            let s = self.ask_line(&format!("{} [{min}-{max}] ({current}): ", label.bold()))?;
            if s.is_empty() {
                return Ok(current);
            }
            match s.parse::<f64>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(n),
                _ => {
                    let msg = format!("{label} must be a number between {min} and {max}.");
                    self.message(Tone::Warning, &msg)?
                }
            }
        }
    }

    /// Pick one option by number or name; blank keeps `current`.
    pub fn ask_choice(
        &mut self,
        label: &str,
        options: &[&str],
        current: usize,
    ) -> io::Result<usize> {
        writeln!(self.out, "{}", label.bold())?;
        for (i, o) in options.iter().enumerate() {
            let mark = if i == current { "*" } else { " " };
            writeln!(self.out, " {mark}{:>2}) {o}", i + 1)?;
        }
        loop {
            let keep = options.get(current).copied().unwrap_or("");
            let s = self.ask_line(&format!("Choice ({keep}): "))?;
            if s.is_empty() {
                return Ok(current);
            }
            match pick(options, &s) {
                Some(i) => return Ok(i),
                None => self.message(Tone::Warning, &format!("'{s}' is not one of the options."))?,
            }
        }
    }

    /// Comma-separated numbers or names. Blank keeps `current`, `-` clears.
    pub fn ask_multi(
        &mut self,
        label: &str,
        options: &[&str],
        current: &[String],
    ) -> io::Result<Vec<String>> {
        writeln!(self.out, "{}", label.bold())?;
        for (i, o) in options.iter().enumerate() {
            let mark = if current.iter().any(|c| c == o) { "x" } else { " " };
            writeln!(self.out, " [{mark}]{:>2}) {o}", i + 1)?;
        }
        loop {
            let s = self.ask_line("Select (e.g. 1,3; blank keeps, - clears): ")?;
            if s.is_empty() {
                return Ok(current.to_vec());
            }
            if s == "-" {
                return Ok(Vec::new());
            }
            let picked: Option<Vec<String>> = s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| pick(options, t).map(|i| options[i].to_string()))
                .collect();
            match picked {
                Some(v) => {
                    let mut unique: Vec<String> = Vec::new();
                    for item in v {
                        if !unique.contains(&item) {
                            unique.push(item);
                        }
                    }
                    return Ok(unique);
                }
                None => {
                    let msg = "Use option numbers or names separated by commas.";
                    self.message(Tone::Warning, msg)?
                }
            }
        }
    }

    /// Free text; blank keeps `current`, `-` clears.
    pub fn ask_text(
        &mut self,
        label: &str,
        placeholder: &str,
        current: &str,
    ) -> io::Result<String> {
        let hint = if current.is_empty() { placeholder } else { current };
        let s = self.ask_line(&format!("{} ({}): ", label.bold(), hint.dimmed()))?;
        Ok(match s.as_str() {
            "" => current.to_string(),
            "-" => String::new(),
            _ => s,
        })
    }

    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let ans = self.ask_line(&format!("{prompt} [y/N]: "))?.to_lowercase();
        Ok(ans == "y" || ans == "yes")
    }

    /// Numbered menu; returns the picked index.
    pub fn menu(&mut self, title: &str, items: &[&str]) -> io::Result<usize> {
        writeln!(self.out, "\n{}", title.bold())?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.out, "  {:>2}) {item}", i + 1)?;
        }
        loop {
            let s = self.ask_line("> ")?;
            if let Some(i) = pick(items, &s) {
                return Ok(i);
            }
            self.message(Tone::Warning, &format!("Pick 1-{}.", items.len()))?;
        }
    }

    /// Walks every field of `form`, starting each at the value in `prefill`
    /// when it fits the field, else at the field's default.
    pub fn collect_form(
        &mut self,
        form: &FormSpec,
        prefill: &FormSubmission,
    ) -> io::Result<FormSubmission> {
        writeln!(self.out, "\n{}", form.title.bold())?;
        writeln!(self.out, "{}", form.intro.dimmed())?;
        if !prefill.is_empty() {
            let msg = "Starting from your previous answers. Press Enter to keep a value.";
            self.message(Tone::Info, msg)?;
        }
        let mut answers = FormSubmission::new();
        for section in form.sections {
            writeln!(self.out, "\n{}", section.title.cyan().bold())?;
            for field in section.fields {
                let start = starting_value(field, prefill, &answers);
                let value = match (field.kind, start) {
                    (FieldKind::IntRange { min, max, .. }, FieldValue::Int(n)) => {
                        FieldValue::Int(self.ask_int(field.label, min, max, n)?)
                    }
                    (FieldKind::SingleChoice { options, default }, FieldValue::Text(t)) => {
                        let current = options.iter().position(|o| *o == t).unwrap_or(default);
                        let picked = self.ask_choice(field.label, options, current)?;
                        FieldValue::Text(options[picked].to_string())
                    }
                    (FieldKind::MultiChoice { options }, FieldValue::List(items)) => {
                        FieldValue::List(self.ask_multi(&required_label(field), options, &items)?)
                    }
                    (FieldKind::FreeText { placeholder }, FieldValue::Text(t)) => {
                        FieldValue::Text(self.ask_text(field.label, placeholder, &t)?)
                    }
                    (_, other) => other,
                };
                answers.insert(field.name, value);
            }
        }
        self.message(Tone::Info, &format!("{}...", form.submit_label))?;
        Ok(answers)
    }

    /// Reads a credential. On a real terminal the characters are masked.
    pub fn ask_secret(&mut self, prompt: &str) -> io::Result<String> {
        if !self.tty {
            return self.ask_line(prompt);
        }
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        terminal::enable_raw_mode()?;
        let read = read_masked(&mut self.out);
        terminal::disable_raw_mode()?;
        write!(self.out, "\r\n")?;
        read
    }

    /// Spinner shown while waiting on the generation service. Hidden when
    /// not attached to a terminal.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if !self.tty {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

fn read_masked(out: &mut impl Write) -> io::Result<String> {
    let mut s = String::new();
    loop {
        let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(s),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Esc => return Ok(String::new()),
            KeyCode::Backspace => {
                if s.pop().is_some() {
                    write!(out, "\u{8} \u{8}")?;
                }
            }
            KeyCode::Char(c) => {
                s.push(c);
                write!(out, "*")?;
            }
            _ => {}
        }
        out.flush()?;
    }
}

fn required_label(field: &FieldSpec) -> String {
    if field.required {
        format!("{} (required)", field.label)
    } else {
        field.label.to_string()
    }
}

fn starting_value(
    field: &FieldSpec,
    prefill: &FormSubmission,
    answers: &FormSubmission,
) -> FieldValue {
    let fits = |v: &FieldValue| match (field.kind, v) {
        (FieldKind::IntRange { min, max, .. }, FieldValue::Int(n)) => (min..=max).contains(n),
        (FieldKind::SingleChoice { options, .. }, FieldValue::Text(t)) => {
            options.contains(&t.as_str())
        }
        (FieldKind::MultiChoice { options }, FieldValue::List(items)) => {
            items.iter().all(|i| options.contains(&i.as_str()))
        }
        (FieldKind::FreeText { .. }, FieldValue::Text(_)) => true,
        _ => false,
    };
    match prefill.get(field.name) {
        Some(v) if fits(v) => v.clone(),
        _ => field.default_value(answers),
    }
}

/// 1-based number or case-insensitive name.
fn pick(options: &[&str], s: &str) -> Option<usize> {
    let s = s.trim();
    if let Ok(n) = s.parse::<usize>() {
        return (1..=options.len()).contains(&n).then(|| n - 1);
    }
    options.iter().position(|o| o.eq_ignore_ascii_case(s))
}

fn percent(current: i64, goal: i64) -> i64 {
    if goal <= 0 {
        return 0;
    }
    (current.max(0) * 100 / goal).min(100)
}

pub fn gauge_bar(current: i64, goal: i64, width: usize) -> String {
    let filled = (percent(current, goal) as usize * width) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Domain, TRAINING_FORM};
    use std::io::Cursor;

    fn term(input: &str) -> Terminal<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        Terminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(t: Terminal<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(t.into_output()).unwrap()
    }

    #[test]
    fn ask_int_retries_until_in_range() {
        let mut t = term("abc\n300\n42\n");
        assert_eq!(t.ask_int("Age", 16, 80, 25).unwrap(), 42);
        let out = output(t);
        assert_eq!(out.matches("must be a whole number between 16 and 80").count(), 2);
    }

    #[test]
    fn blank_answers_keep_the_current_value() {
        let mut t = term("\n\n\n");
        assert_eq!(t.ask_int("Age", 16, 80, 25).unwrap(), 25);
        assert_eq!(t.ask_choice("Gender", &["Male", "Female"], 1).unwrap(), 1);
        let days = t.ask_multi("Days", &["Mon", "Tue"], &["Tue".into()]).unwrap();
        assert_eq!(days, vec!["Tue".to_string()]);
    }

    #[test]
    fn choices_accept_numbers_and_names() {
        let mut t = term("2\nfemale\n9\nmale\n");
        let opts = ["Male", "Female", "Other"];
        assert_eq!(t.ask_choice("Gender", &opts, 0).unwrap(), 1);
        assert_eq!(t.ask_choice("Gender", &opts, 0).unwrap(), 1);
        assert_eq!(t.ask_choice("Gender", &opts, 2).unwrap(), 0);
    }

    #[test]
    fn multi_select_parses_lists_and_clears() {
        let mut t = term("1, grill,1\n-\n");
        let opts = ["Oven", "Grill"];
        let picked = t.ask_multi("Kitchen", &opts, &[]).unwrap();
        assert_eq!(picked, vec!["Oven".to_string(), "Grill".to_string()]);
        assert!(t.ask_multi("Kitchen", &opts, &["Oven".into()]).unwrap().is_empty());
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut t = term("");
        let err = t.ask_line("> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn non_tty_secret_reads_a_plain_line() {
        let mut t = term("  sk-123  \n");
        assert_eq!(t.ask_secret("Key: ").unwrap(), "sk-123");
    }

    #[test]
    fn collect_form_starts_from_prefill() {
        let fields = TRAINING_FORM.fields().count();
        let input = "\n".repeat(fields);
        let mut t = term(&input);
        let prefill = FormSubmission::new()
            .with("age", FieldValue::Int(40))
            .with("height", FieldValue::Int(999));
        let answers = t.collect_form(&TRAINING_FORM, &prefill).unwrap();
        assert_eq!(answers.get("age"), Some(&FieldValue::Int(40)));
        assert_eq!(answers.get("height"), TRAINING_FORM.defaults().get("height"));
        assert_eq!(answers.len(), fields);
        assert!(crate::profile::collect(Domain::Training, &answers).is_ok());
    }

    #[test]
    fn paint_renders_every_block() {
        let mut t = term("");
        let screen = Screen {
            title: "Trackers".into(),
            subtitle: None,
            banner: Some(Banner { tone: Tone::Error, text: "AI service is not available.".into() }),
            blocks: vec![
                Block::Gauge { label: "Water today".into(), current: 500, goal: 2500, unit: "ml" },
                Block::Tips { title: "Tips".into(), items: vec!["Sleep".into()] },
            ],
        };
        t.paint(&screen).unwrap();
        let out = output(t);
        assert!(out.contains("✖ AI service is not available."));
        assert!(out.contains("[####----------------] 500/2500 ml (20%)"));
        assert!(out.contains("  1. Sleep"));
    }

    #[test]
    fn gauge_caps_at_full() {
        assert_eq!(gauge_bar(5000, 2500, 4), "[####]");
        assert_eq!(gauge_bar(0, 0, 2), "[--]");
    }
}
