use std::{collections::HashMap, sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use interprocess::local_socket::{ListenerOptions, tokio::prelude::*};
use log::{debug, error, info};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use whereami_geocoding::NominatimGeocoder;
use whereami_logic::{
    AuthorizationStatus, Coordinate, Geocoder, LocationService, Placemark, PostalAddress,
    RequestCoordinator, StateUpdateSender,
};
use whereami_test_shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GeocoderKind {
    /// Answer with the address given by `--field`
    Offline,
    /// Use the Nominatim server configured at build time
    Nominatim,
}

#[derive(Parser)]
struct Cli {
    /// Name of the local socket to listen on
    socket: String,

    /// Latitude every fix reports
    #[arg(long, default_value_t = 37.0, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude every fix reports
    #[arg(long, default_value_t = -122.0, allow_negative_numbers = true)]
    long: f64,

    /// Make every location request fail
    #[arg(long)]
    fail_location: bool,

    /// How long a location request takes, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    #[arg(long, value_enum, default_value_t = GeocoderKind::Offline)]
    geocoder: GeocoderKind,

    /// Address field for the offline geocoder as KEY=VALUE (Street, City, State, ZIP, Country).
    /// With none given the offline geocoder answers without any address fields.
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw.split_once('=').context("Expected KEY=VALUE")?;
    Ok((key.to_string(), value.to_string()))
}

struct ScriptedLocation {
    fix: Option<Coordinate>,
    delay: Duration,
}

impl LocationService for ScriptedLocation {
    async fn authorization_status(&self) -> Result<AuthorizationStatus> {
        Ok(AuthorizationStatus::Authorized)
    }

    async fn request_authorization(&self) -> Result<AuthorizationStatus> {
        Ok(AuthorizationStatus::Authorized)
    }

    async fn request_location(&self) -> Result<Coordinate> {
        tokio::time::sleep(self.delay).await;
        self.fix.context("Location unavailable")
    }
}

enum DaemonGeocoder {
    Offline(HashMap<String, String>),
    Nominatim(NominatimGeocoder),
}

impl Geocoder for DaemonGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Vec<Placemark>> {
        match self {
            Self::Offline(fields) if fields.is_empty() => Ok(vec![Placemark::default()]),
            Self::Offline(fields) => Ok(vec![Placemark::new(
                PostalAddress::from_address_dictionary(fields),
            )]),
            Self::Nominatim(geocoder) => geocoder.reverse_geocode(coordinate).await,
        }
    }
}

struct UpdateSender(mpsc::Sender<TestingResponse>);

impl StateUpdateSender for UpdateSender {
    fn send_update(&self) {
        let tx = self.0.clone();
        tokio::spawn(async move {
            tx.send(TestingResponse::ListUpdated)
                .await
                .expect("Failed to send");
        });
    }
}

type Coordinator = RequestCoordinator<ScriptedLocation, DaemonGeocoder, UpdateSender>;

async fn process_req(
    coordinator: &Arc<Coordinator>,
    responses: &mpsc::Sender<TestingResponse>,
    req: TestingRequest,
) {
    debug!("Processing {req:?}");
    let resp = match req {
        TestingRequest::Add => {
            let coordinator = coordinator.clone();
            let responses = responses.clone();
            tokio::spawn(async move {
                let outcome = coordinator.trigger_add().await;
                responses
                    .send(outcome.into())
                    .await
                    .expect("Failed to push response");
            });
            return;
        }
        TestingRequest::Delete(index) => match coordinator.delete_at(index).await {
            Ok(record) => TestingResponse::Deleted(record.row_text()),
            Err(why) => why.into(),
        },
        TestingRequest::Rows => TestingResponse::Rows(coordinator.rows().await),
        TestingRequest::Count => TestingResponse::Count(coordinator.count().await),
    };
    responses.send(resp).await.expect("Failed to push response");
}

fn mk_coordinator(cli: &Cli, responses: mpsc::Sender<TestingResponse>) -> Result<Coordinator> {
    let location = ScriptedLocation {
        fix: (!cli.fail_location).then(|| Coordinate::new(cli.lat, cli.long)),
        delay: Duration::from_millis(cli.delay_ms),
    };
    let geocoder = match cli.geocoder {
        GeocoderKind::Offline => DaemonGeocoder::Offline(cli.fields.iter().cloned().collect()),
        GeocoderKind::Nominatim => DaemonGeocoder::Nominatim(NominatimGeocoder::new()?),
    };
    Ok(Coordinator::new(location, geocoder, UpdateSender(responses)))
}

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();
    let socket_name = get_socket_name(cli.socket.clone())?;
    let opts = ListenerOptions::new().name(socket_name);
    let listener = opts.create_tokio().context("Failed to bind to socket")?;
    let (resp_tx, mut resp_rx) = mpsc::channel::<TestingResponse>(40);

    let coordinator = Arc::new(mk_coordinator(&cli, resp_tx.clone())?);
    coordinator
        .bootstrap_permissions()
        .await
        .context("Failed to bootstrap permissions")?;

    info!("Testing Daemon Ready");

    'server: loop {
        let res = tokio::select! {
            res = listener.accept() => {
                res
            },
            Ok(_) = tokio::signal::ctrl_c() => {
                break 'server;
            }
        };

        match res {
            Ok(stream) => {
                let dropped = drain_stale(&mut resp_rx);
                if dropped > 0 {
                    debug!("Dropped {dropped} responses meant for a previous connection");
                }

                let mut recv = BufReader::new(&stream);
                let mut send = &stream;

                let mut buffer = String::with_capacity(256);

                loop {
                    tokio::select! {
                        Ok(_) = tokio::signal::ctrl_c() => {
                            break 'server;
                        }
                        res = recv.read_line(&mut buffer) => {
                            match res {
                                Ok(0) => {
                                    break;
                                }
                                Ok(_amnt) => {
                                    match serde_json::from_str::<TestingRequest>(&buffer) {
                                        Ok(req) => process_req(&coordinator, &resp_tx, req).await,
                                        Err(why) => {
                                            let resp = TestingResponse::Error(format!("Bad request: {why}"));
                                            resp_tx.send(resp).await.expect("Failed to push response");
                                        }
                                    }
                                    buffer.clear();
                                }
                                Err(why) => {
                                    error!("Read Error: {why:?}");
                                    break;
                                }
                            }
                        }
                        Some(resp) = resp_rx.recv() => {
                            let encoded = encode_line(&resp)?;
                            if let Err(why) = send.write_all(&encoded).await {
                                error!("Write Error: {why:?}");
                                break;
                            }
                        }
                    }
                }
            }
            Err(why) => error!("Error from connection: {why:?}"),
        }
    }

    Ok(())
}
