use anyhow::{Result, bail};
use mailprobe_lib::{CatchAllResult, GuessResult, MailRoute, PatternReport, VerificationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

impl Format {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "human" => Ok(Self::Human),
            "json" if cfg!(feature = "with-serde") => Ok(Self::Json),
            "json" => bail!("format=json nécessite la feature 'with-serde'"),
            other => bail!("unknown --format '{other}', use: human|json"),
        }
    }
}

/// One report per subcommand.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[cfg_attr(feature = "with-serde", serde(untagged))]
pub enum Report {
    Verify(VerificationResult),
    CatchAll(CatchAllResult),
    Guess(GuessResult),
    Pattern(PatternReport),
    Mx { domain: String, route: MailRoute },
}

impl Report {
    /// Drives exit code 2.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Verify(r) => !r.exists,
            Self::CatchAll(r) => r.error.is_some(),
            Self::Guess(r) => r.best().is_none(),
            Self::Pattern(r) => r.error.is_some(),
            Self::Mx { route, .. } => route.is_empty(),
        }
    }

    pub fn human(&self) -> Vec<String> {
        match self {
            Self::Verify(r) => verification_lines(r),
            Self::CatchAll(r) => catch_all_lines(r),
            Self::Guess(r) => guess_lines(r),
            Self::Pattern(r) => pattern_lines(r),
            Self::Mx { domain, route } => mx_lines(domain, route),
        }
    }
}

pub fn render(report: &Report, format: Format) -> Result<()> {
    match format {
        Format::Human => {
            for line in report.human() {
                println!("{line}");
            }
        }
        Format::Json => {
            #[cfg(feature = "with-serde")]
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn risk_line(flag: bool) -> Option<String> {
    flag.then(|| {
        "        caveat: provider known to accept then bounce, acceptance is unreliable".to_string()
    })
}

fn verification_lines(r: &VerificationResult) -> Vec<String> {
    let mut lines = Vec::new();
    if r.exists {
        lines.push(format!("[EXISTS] {}", r.email));
    } else {
        lines.push(format!(
            "[{}] {} :: {}",
            r.status.to_string().to_uppercase(),
            r.email,
            r.error.as_deref().unwrap_or("")
        ));
    }
    lines.extend(risk_line(r.high_false_positive_risk));
    for attempt in &r.attempts {
        lines.push(format!(
            "        {}:{} ({}) -> {:?}",
            attempt.host, attempt.port, attempt.transport, attempt.outcome
        ));
    }
    lines
}

fn catch_all_lines(r: &CatchAllResult) -> Vec<String> {
    let mut lines = vec![match (&r.error, r.has_catch_all) {
        (Some(error), _) => format!("[UNKNOWN] {} :: {error}", r.domain),
        (None, true) => format!("[CATCH-ALL] {}", r.domain),
        (None, false) => format!("[STRICT] {}", r.domain),
    }];
    if !r.mail_route.is_empty() {
        lines.push(format!("        mx: {}", r.mail_route.join(", ")));
    }
    if let Some(probe) = &r.probed_address {
        lines.push(format!("        probe: {probe}"));
    }
    lines.extend(risk_line(r.high_false_positive_risk));
    lines
}

fn guess_lines(r: &GuessResult) -> Vec<String> {
    let mut lines = Vec::new();
    if r.has_catch_all {
        lines.push("domain is catch-all: every candidate is accepted".to_string());
    }
    for guess in &r.guesses {
        let mark = if guess.exists { "+" } else { "-" };
        lines.push(format!("{mark} {:<40} {}", guess.address, guess.format));
    }
    if let Some(error) = &r.error {
        lines.push(format!("error: {error}"));
    }
    lines.extend(risk_line(r.high_false_positive_risk));
    lines
}

fn pattern_lines(r: &PatternReport) -> Vec<String> {
    let mut lines = vec![format!("domain: {}", r.domain)];
    for probe in &r.probes {
        let mark = if probe.exists { "+" } else { "-" };
        lines.push(format!("{mark} {}", probe.address));
    }
    if !r.candidate_formats.is_empty() {
        let formats: Vec<String> = r.candidate_formats.iter().map(|f| f.to_string()).collect();
        lines.push(format!("formats to try: {}", formats.join(", ")));
    }
    if let Some(error) = &r.error {
        lines.push(format!("error: {error}"));
    }
    lines
}

fn mx_lines(domain: &str, route: &MailRoute) -> Vec<String> {
    if route.is_empty() {
        return vec![format!("{domain}: no MX records")];
    }
    route
        .records()
        .iter()
        .map(|record| format!("{domain}: {} {}", record.preference, record.exchange))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::{FormatTag, Guess, MxRecord};

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Format::parse("csv").is_err());
        assert_eq!(Format::parse("human").ok(), Some(Format::Human));
    }

    #[test]
    fn mx_lines_follow_preference() {
        let route = MailRoute::from_records(vec![
            MxRecord::new(20, "b.example.com"),
            MxRecord::new(10, "a.example.com"),
        ]);
        assert_eq!(
            mx_lines("example.com", &route),
            vec!["example.com: 10 a.example.com", "example.com: 20 b.example.com"]
        );
        assert!(Report::Mx {
            domain: "example.com".into(),
            route: MailRoute::default(),
        }
        .is_negative());
    }

    #[test]
    fn guess_without_hit_is_negative() {
        let result = GuessResult {
            guesses: vec![Guess {
                address: "john@example.com".into(),
                exists: false,
                format: FormatTag::Custom,
            }],
            ..GuessResult::default()
        };
        let report = Report::Guess(result);
        assert!(report.is_negative());
        assert_eq!(report.human()[0], format!("- {:<40} custom", "john@example.com"));
    }
}
