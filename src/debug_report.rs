use graphmaster::{ChatResultVerbose, SentenceMetrics};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_turn(input: &str, verbose: &ChatResultVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    let metrics = &verbose.metrics;
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Input: \"{}\"", input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Sentences ━━━", ansi::GRAY));
    if metrics.sentences.is_empty() {
        println!("{}", palette.dim("  No sentences (input was empty or only punctuation)"));
    }
    for (idx, sentence) in metrics.sentences.iter().enumerate() {
        print_sentence(idx, sentence, &palette);
    }

    println!("\n{}", palette.paint("━━━ Output ━━━", ansi::GRAY));
    let output = verbose.result.output();
    if output.is_empty() {
        println!("{}", palette.dim("  (empty)"));
    } else {
        println!("  {}", palette.bold(palette.paint(output, ansi::GREEN)));
    }
    if verbose.result.timed_out {
        println!("  {}", palette.paint("✗ timed out", ansi::RED));
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Redirects: {}  │  Max depth: {}  │  Nodes: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(metrics.redirects.to_string(), ansi::CYAN),
        palette.paint(metrics.max_depth.to_string(), ansi::CYAN),
        palette.dim(metrics.nodes_visited.to_string()),
    );
    println!();
}

fn print_sentence(idx: usize, sentence: &SentenceMetrics, palette: &ansi::Palette) {
    println!("  {} {}", palette.paint(format!("[{}]", idx), ansi::GRAY), palette.paint(&sentence.path, ansi::BLUE));
    if sentence.pattern.is_empty() {
        println!("      {}", palette.dim("✗ no category matched"));
        return;
    }

    println!(
        "      {} {}  {} {}",
        palette.dim("pattern:"),
        palette.paint(&sentence.pattern, ansi::CYAN),
        palette.dim("│ from:"),
        palette.paint(sentence.source.as_deref().unwrap_or("?"), ansi::YELLOW),
    );
    if !sentence.input_star.is_empty() {
        println!("      {} {}", palette.dim("stars:"), palette.paint(sentence.input_star.join(" | "), ansi::YELLOW));
    }
    println!(
        "      {} {}  {} {:?}  {} {:?}",
        palette.dim("→"),
        palette.paint(&sentence.output, ansi::GREEN),
        palette.dim("│ match"),
        sentence.matching,
        palette.dim("│ eval"),
        sentence.processing,
    );
}
