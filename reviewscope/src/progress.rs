// indicatif draws nothing when stderr is not a tty, so record loops also log their rate
use {
    std::time::{Duration, Instant},
    tracing::info,
};

const REPORT_INTERVAL: Duration = Duration::from_secs(10);

pub struct Progress {
    message: String,
    total: usize,
    processed: usize,
    started_at: Instant,
    reported_at: Instant,
}

impl Progress {
    pub fn new(message: &str, total: usize) -> Self {
        Self {
            message: message.to_owned(),
            total,
            processed: 0,
            started_at: Instant::now(),
            reported_at: Instant::now(),
        }
    }

    pub fn update(&mut self) {
        self.processed += 1;

        let now = Instant::now();
        if now - self.reported_at >= REPORT_INTERVAL {
            self.reported_at = now;
            self.report(now);
        }
    }

    pub fn finish(&self) {
        self.report(Instant::now());
    }

    fn percent_done(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f32 * 100.0 / self.total as f32
        }
    }

    fn report(&self, now: Instant) {
        let elapsed = (now - self.started_at).as_secs_f32().max(f32::EPSILON);
        info!(
            "{}: {}/{} ({:.1}%, {:.2}/second)",
            self.message,
            self.processed,
            self.total,
            self.percent_done(),
            self.processed as f32 / elapsed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_share_of_records() {
        let mut progress = Progress::new("analyzing reviews", 4);
        progress.update();
        assert_eq!(progress.percent_done(), 25.0);
        assert_eq!(Progress::new("empty", 0).percent_done(), 100.0);
    }
}
