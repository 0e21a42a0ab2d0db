use std::sync::mpsc;
use std::thread;

use crate::api::client::{ApiError, PracticeApi};
use crate::api::types::{AnswerResult, Clef, Difficulty, GraphPoint, Melody, Prompt, StatsSummary};

/// A network call tagged with the issuing controller's generation counter.
/// Responses carrying a stale generation are discarded on arrival, so at
/// most one prompt/melody/stats response is ever applied per generation.
#[derive(Clone, Debug)]
pub enum ApiRequest {
    NewKey { generation: u64 },
    CheckKey { generation: u64, answer: char },
    GenerateMelody { generation: u64, difficulty: Difficulty, clef: Clef },
    ExportMelody { generation: u64, melody: Melody },
    Stats { generation: u64 },
    GraphData { generation: u64 },
}

pub enum ApiResponse {
    Prompt { generation: u64, result: Result<Prompt, ApiError> },
    Answer { generation: u64, result: Result<AnswerResult, ApiError> },
    Melody { generation: u64, result: Result<Melody, ApiError> },
    Export { generation: u64, result: Result<Vec<u8>, ApiError> },
    Stats { generation: u64, result: Result<StatsSummary, ApiError> },
    Graph { generation: u64, result: Result<Vec<GraphPoint>, ApiError> },
}

/// Background worker owning all network I/O. Requests execute one at a
/// time in submission order; the UI thread polls responses on each tick and
/// never blocks on the network.
pub struct Fetcher {
    tx: mpsc::Sender<ApiRequest>,
    rx: mpsc::Receiver<ApiResponse>,
}

impl Fetcher {
    pub fn spawn<A>(api: A) -> Self
    where
        A: PracticeApi + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<ApiRequest>();
        let (resp_tx, resp_rx) = mpsc::channel::<ApiResponse>();

        thread::spawn(move || {
            while let Ok(request) = req_rx.recv() {
                if resp_tx.send(execute(&api, request)).is_err() {
                    return;
                }
            }
        });

        Self {
            tx: req_tx,
            rx: resp_rx,
        }
    }

    pub fn submit(&self, request: ApiRequest) {
        let _ = self.tx.send(request);
    }

    pub fn poll(&self) -> Option<ApiResponse> {
        self.rx.try_recv().ok()
    }
}

fn execute<A: PracticeApi>(api: &A, request: ApiRequest) -> ApiResponse {
    match request {
        ApiRequest::NewKey { generation } => ApiResponse::Prompt {
            generation,
            result: api.new_key(),
        },
        ApiRequest::CheckKey { generation, answer } => ApiResponse::Answer {
            generation,
            result: api.check_key(&answer.to_string()),
        },
        ApiRequest::GenerateMelody {
            generation,
            difficulty,
            clef,
        } => ApiResponse::Melody {
            generation,
            result: api.generate_melody(difficulty, clef),
        },
        ApiRequest::ExportMelody { generation, melody } => ApiResponse::Export {
            generation,
            result: api.export_melody(&melody),
        },
        ApiRequest::Stats { generation } => ApiResponse::Stats {
            generation,
            result: api.stats(),
        },
        ApiRequest::GraphData { generation } => ApiResponse::Graph {
            generation,
            result: api.graph_data(),
        },
    }
}
