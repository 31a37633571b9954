use clap::{Parser, Subcommand};
use interprocess::local_socket::{tokio::Stream, traits::tokio::Stream as _};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use whereami_test_shared::*;

#[derive(Parser)]
struct Cli {
    /// Name of the local socket the test daemon is listening on
    socket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the current location
    Add {
        /// Send this many adds back to back, all but the first should be debounced
        #[arg(long, default_value_t = 1)]
        times: usize,
    },
    /// Delete a row
    Delete {
        /// Index of the row, 0 is the newest
        index: usize,
    },
    /// Print every row
    Rows,
    /// Print the number of rows
    Count,
}

impl Commands {
    fn requests(&self) -> Vec<TestingRequest> {
        match self {
            Self::Add { times } => vec![TestingRequest::Add; *times],
            Self::Delete { index } => vec![TestingRequest::Delete(*index)],
            Self::Rows => vec![TestingRequest::Rows],
            Self::Count => vec![TestingRequest::Count],
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let cli = Cli::parse();

    let socket_name = get_socket_name(cli.socket.clone()).context("Failed to get socket name")?;

    let stream = Stream::connect(socket_name)
        .await
        .context("Failed to connect to socket")?;

    let requests = cli.command.requests();
    let mut send = &stream;
    for req in requests.iter() {
        send.write_all(&encode_line(req)?)
            .await
            .context("Failed to send request")?;
    }

    let mut recv = BufReader::new(&stream);
    let mut buffer = String::with_capacity(256);
    let mut replies = 0;

    while replies < requests.len() {
        buffer.clear();
        let read = recv
            .read_line(&mut buffer)
            .await
            .context("Failed to read response")?;
        if read == 0 {
            bail!("Daemon closed the connection");
        }

        let resp = serde_json::from_str::<TestingResponse>(&buffer)
            .context("Failed to parse response")?;

        match &resp {
            TestingResponse::Rows(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    println!("{i}: {} | {}", row.coordinate, row.address);
                }
            }
            other => println!("{other:?}"),
        }

        if resp.is_reply() {
            replies += 1;
        }
    }

    Ok(())
}
