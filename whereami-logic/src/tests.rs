use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::anyhow;
use tokio::{
    sync::{Mutex, mpsc},
    task::yield_now,
};

use crate::{
    Geocoder, Placemark, PostalAddress, StateUpdateSender,
    location::{AuthorizationStatus, Coordinate, LocationService},
    prelude::*,
};

type FixRx = mpsc::Receiver<Result<Coordinate>>;
type FixTx = mpsc::Sender<Result<Coordinate>>;

/// Location service whose fixes are handed out by the test through a channel, so requests can
/// be held in flight for as long as needed.
pub struct MockLocation {
    status: AuthorizationStatus,
    fixes: Mutex<FixRx>,
    authorization_requests: AtomicUsize,
    requests: AtomicUsize,
    outstanding: AtomicUsize,
    max_outstanding: AtomicUsize,
}

impl MockLocation {
    pub fn new(status: AuthorizationStatus) -> (Self, FixTx) {
        let (tx, rx) = mpsc::channel(20);
        let location = Self {
            status,
            fixes: Mutex::new(rx),
            authorization_requests: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            outstanding: AtomicUsize::new(0),
            max_outstanding: AtomicUsize::new(0),
        };
        (location, tx)
    }

    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding.load(Ordering::SeqCst)
    }
}

impl LocationService for MockLocation {
    async fn authorization_status(&self) -> Result<AuthorizationStatus> {
        Ok(self.status)
    }

    async fn request_authorization(&self) -> Result<AuthorizationStatus> {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
        Ok(AuthorizationStatus::Authorized)
    }

    async fn request_location(&self) -> Result<Coordinate> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_outstanding.fetch_max(now, Ordering::SeqCst);

        let fix = self.fixes.lock().await.recv().await;

        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        fix.unwrap_or_else(|| Err(anyhow!("Fix channel closed")))
    }
}

type AnswerRx = mpsc::Receiver<Result<Vec<Placemark>>>;
type AnswerTx = mpsc::Sender<Result<Vec<Placemark>>>;

enum Answers {
    Fixed(Vec<Placemark>),
    Failing,
    Gated(Mutex<AnswerRx>),
}

pub struct MockGeocoder {
    answers: Answers,
}

impl MockGeocoder {
    /// Always answers with `placemarks`
    pub fn fixed(placemarks: Vec<Placemark>) -> Self {
        Self {
            answers: Answers::Fixed(placemarks),
        }
    }

    /// Always fails
    pub fn failing() -> Self {
        Self {
            answers: Answers::Failing,
        }
    }

    /// Waits for each answer to be sent by the test
    pub fn gated() -> (Self, AnswerTx) {
        let (tx, rx) = mpsc::channel(20);
        let geocoder = Self {
            answers: Answers::Gated(Mutex::new(rx)),
        };
        (geocoder, tx)
    }
}

impl Geocoder for MockGeocoder {
    async fn reverse_geocode(&self, _coordinate: Coordinate) -> Result<Vec<Placemark>> {
        match &self.answers {
            Answers::Fixed(placemarks) => Ok(placemarks.clone()),
            Answers::Failing => Err(anyhow!("Geocoder unavailable")),
            Answers::Gated(rx) => rx
                .lock()
                .await
                .recv()
                .await
                .unwrap_or_else(|| Err(anyhow!("Answer channel closed"))),
        }
    }
}

pub struct CountingSender(Arc<AtomicUsize>);

impl CountingSender {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (Self(count.clone()), count)
    }
}

impl StateUpdateSender for CountingSender {
    fn send_update(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Placemark whose single-line address is just `city`
pub fn mk_placemark(city: &str) -> Placemark {
    Placemark::new(PostalAddress {
        city: city.to_string(),
        ..Default::default()
    })
}

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..10 {
        yield_now().await;
    }
}
