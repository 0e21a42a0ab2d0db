use crate::api::fetch::{ApiRequest, ApiResponse};
use crate::api::types::{ActivityEntry, GraphPoint, StatsSummary};

/// How many recent-activity rows the statistics screen shows.
pub const RECENT_ACTIVITY_ROWS: usize = 5;

/// A formatted recent-activity row, interpreted from the server's stringly
/// activity log at display time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityLine {
    pub timestamp: String,
    pub label: String,
    pub detail: String,
}

/// Statistics screen state. Both fetches are issued together when the
/// screen opens; the trend series is dropped again on close so a reopened
/// screen always charts fresh data.
pub struct StatsView {
    pub open: bool,
    pub stats: Option<StatsSummary>,
    pub graph: Option<Vec<GraphPoint>>,
    pub last_error: Option<String>,
    generation: u64,
    graph_generation: u64,
}

impl StatsView {
    pub fn new() -> Self {
        Self {
            open: false,
            stats: None,
            graph: None,
            last_error: None,
            generation: 0,
            graph_generation: 0,
        }
    }

    /// Open the screen and request both the summary and the trend series.
    /// Each series tracks its own generation, so a summary refresh racing
    /// the open cannot invalidate the in-flight trend fetch.
    pub fn open(&mut self) -> [ApiRequest; 2] {
        self.open = true;
        self.last_error = None;
        self.generation += 1;
        self.graph_generation += 1;
        [
            ApiRequest::Stats {
                generation: self.generation,
            },
            ApiRequest::GraphData {
                generation: self.graph_generation,
            },
        ]
    }

    /// Re-request the summary alone, without touching the trend series.
    /// Used after each answer to pull the server's session progress.
    pub fn refresh(&mut self) -> ApiRequest {
        self.generation += 1;
        ApiRequest::Stats {
            generation: self.generation,
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.graph = None;
    }

    pub fn on_response(&mut self, response: &ApiResponse) {
        match response {
            ApiResponse::Stats { generation, result } => {
                if *generation != self.generation {
                    return;
                }
                match result {
                    Ok(stats) => self.stats = Some(stats.clone()),
                    Err(err) => self.last_error = Some(err.to_string()),
                }
            }
            ApiResponse::Graph { generation, result } => {
                if *generation != self.graph_generation || !self.open {
                    return;
                }
                match result {
                    Ok(points) => self.graph = Some(points.clone()),
                    Err(err) => self.last_error = Some(err.to_string()),
                }
            }
            _ => {}
        }
    }

    /// Newest-first recent activity, capped at [`RECENT_ACTIVITY_ROWS`].
    pub fn recent_activities(&self) -> Vec<ActivityLine> {
        let Some(stats) = &self.stats else {
            return Vec::new();
        };
        stats
            .recent_sessions
            .iter()
            .rev()
            .take(RECENT_ACTIVITY_ROWS)
            .map(format_activity)
            .collect()
    }
}

impl Default for StatsView {
    fn default() -> Self {
        Self::new()
    }
}

fn format_activity(entry: &ActivityEntry) -> ActivityLine {
    let (label, detail) = match entry.kind.as_str() {
        "key_practice" => {
            let mark = if entry.score == "1" { '✔' } else { '✘' };
            let mut detail = format!("{mark} {}", entry.correct_answer);
            if !entry.clef.is_empty() {
                detail.push_str(&format!(" ({} clef)", entry.clef));
            }
            if let Ok(ms) = entry.response_time.parse::<f64>() {
                detail.push_str(&format!(", {}ms", ms.round() as i64));
            }
            ("Key Practice".to_string(), detail)
        }
        "sight_reading_generated" => (
            "Sight Reading".to_string(),
            format!("{} level", entry.difficulty),
        ),
        "pdf_export" => ("PDF Export".to_string(), String::new()),
        other => (other.to_string(), String::new()),
    };
    ActivityLine {
        timestamp: entry.timestamp.clone(),
        label,
        detail,
    }
}
