use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::domain::{JtvError, Message, ViewConfig};
use crate::engine::Record;

/// Fetches the record list: one GET against the configured endpoint,
/// expecting a JSON array of flat objects. There is no retry and no partial
/// delivery; the whole payload arrives in one response or not at all.
pub struct DataSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl DataSource {
    pub fn new(config: &ViewConfig) -> Result<Self, JtvError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(DataSource {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn fetch(&self) -> Result<Vec<Record>, JtvError> {
        debug!("GET {}", self.endpoint);
        let start_time = Instant::now();
        let response = self.client.get(&self.endpoint).send()?.error_for_status()?;
        let records: Vec<Record> = response.json()?;
        info!(
            "Fetched {} records from {} in {}ms",
            records.len(),
            self.endpoint,
            start_time.elapsed().as_millis()
        );
        Ok(records)
    }

    /// Runs the fetch on a background thread; the returned channel carries
    /// exactly one message. If the app quits before the load settles the
    /// receiver is dropped and the late send is silently ignored.
    pub fn spawn_fetch(self) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let message = match self.fetch() {
                Ok(records) => Message::DataLoaded(records),
                Err(e) => {
                    error!("Error fetching data: {:?}", e);
                    Message::LoadFailed(format!("{:?}", e))
                }
            };
            let _ = tx.send(message);
        });
        rx
    }
}
