use std::time::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct Span {
    name: String,
    started_at: Instant,
}

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
}

/// Reports how long each phase of a long-running build takes, through the `log` crate. Spans
/// nest; notes and warnings are repeated when the timer is dropped, so they don't get lost in the
/// middle of the output.
pub struct Timer {
    outermost_name: String,
    spans: Vec<Span>,
    progress: Option<Progress>,
    results: Vec<String>,
    notes: Vec<String>,
    warnings: Vec<String>,
    quiet: bool,
}

impl Timer {
    pub fn new(name: &str) -> Timer {
        let mut t = Timer {
            outermost_name: name.to_string(),
            spans: Vec::new(),
            progress: None,
            results: Vec::new(),
            notes: Vec::new(),
            warnings: Vec::new(),
            quiet: false,
        };
        t.start(name);
        t
    }

    /// A timer that doesn't log anything. Meant for tests and callers that don't care.
    pub fn throwaway() -> Timer {
        let mut t = Timer::new("throwaway");
        t.quiet = true;
        t
    }

    pub fn start(&mut self, name: &str) {
        if !self.quiet {
            debug!("{}...", name);
        }
        self.spans.push(Span {
            name: name.to_string(),
            started_at: Instant::now(),
        });
    }

    pub fn stop(&mut self, name: &str) {
        let span = match self.spans.pop() {
            Some(span) => span,
            None => {
                warn!("Timer::stop({}) with nothing started", name);
                return;
            }
        };
        if span.name != name {
            warn!("Timer::stop({}) but {} is the innermost span", name, span.name);
        }
        let line = format!(
            "{}- {} took {}",
            "  ".repeat(self.spans.len()),
            span.name,
            prettyprint_time(elapsed_seconds(span.started_at))
        );
        if !self.quiet {
            debug!("{}", line.trim_start());
        }
        self.results.push(line);
    }

    /// Count through a known number of items. Finishing the last item closes the progress.
    pub fn start_iter(&mut self, name: &str, total_items: usize) {
        if total_items == 0 {
            return;
        }
        self.progress = Some(Progress {
            label: name.to_string(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
        });
    }

    pub fn next(&mut self) {
        let done = match self.progress {
            Some(ref mut p) => {
                p.processed_items += 1;
                p.processed_items >= p.total_items
            }
            None => return,
        };
        if done {
            if let Some(p) = self.progress.take() {
                self.results.push(format!(
                    "{}- {} ({})... {}",
                    "  ".repeat(self.spans.len()),
                    p.label,
                    prettyprint_usize(p.total_items),
                    prettyprint_time(elapsed_seconds(p.started_at))
                ));
            }
        }
    }

    /// Log immediately, but also repeat at the end.
    pub fn note(&mut self, line: String) {
        if !self.quiet {
            info!("{}", line);
        }
        self.notes.push(line);
    }

    pub fn warn(&mut self, line: String) {
        self.warnings.push(line);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Used to end the scope of a timer early.
    pub fn done(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        while let Some(span) = self.spans.last() {
            let name = span.name.clone();
            self.stop(&name);
        }
        if self.quiet {
            return;
        }
        info!("{} summary:", self.outermost_name);
        for line in &self.results {
            info!("{}", line);
        }
        for line in &self.notes {
            info!("note: {}", line);
        }
        if !self.warnings.is_empty() {
            warn!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                warn!("{}", line);
            }
        }
    }
}
