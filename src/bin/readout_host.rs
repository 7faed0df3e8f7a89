//! Sensor Node Readout Host CLI
//!
//! This binary runs on your PC, listens to the node's USB serial output and
//! turns every report (one per button press) into an InfluxDB line-protocol
//! record on stdout. With `--influx-url` each record is also POSTed to the
//! database's `/write` endpoint.
//!
//! ## Usage
//!
//! ```bash
//! # Show serial ports
//! cargo run --features std --bin readout_host -- --list-ports
//!
//! # Connect to the first USB serial port found
//! cargo run --features std --bin readout_host -- --location attic
//!
//! # Connect to specific port, print JSON instead of line protocol
//! cargo run --features std --bin readout_host -- --port /dev/ttyACM0 --json
//! ```
//!
//! ## Uploading
//!
//! ```bash
//! # POST every report to http://influx.host/write?db=environment
//! cargo run --features std --bin readout_host -- --influx-url http://influx.host --db environment
//! ```
//!
//! A failed upload is logged and the reader keeps going; the record is still
//! printed on stdout.

use std::io::{self, BufRead, BufReader, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use sensor_node::report_protocol::{Feed, ReportBlock, ReportParser, DEFAULT_MEASUREMENT};

/// Default serial baud rate (ignored by USB CDC, required by the API)
const DEFAULT_BAUD: u32 = 115_200;

/// Default `location` tag value
const DEFAULT_LOCATION: &str = "mylocation";

/// Default InfluxDB database
const DEFAULT_DATABASE: &str = "environment";

/// Read timeout; reports arrive only on button presses
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for one upload request
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum ReadoutError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid baud rate '{0}'")]
    InvalidBaud(String),
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    ListPorts,
    Read(Options),
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    port: Option<String>,
    baud: u32,
    location: String,
    measurement: String,
    json: bool,
    influx_url: Option<String>,
    database: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            location: DEFAULT_LOCATION.to_string(),
            measurement: DEFAULT_MEASUREMENT.to_string(),
            json: false,
            influx_url: None,
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match parse_args(&args)? {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::ListPorts => {
            list_ports();
            return Ok(());
        }
        Command::Read(options) => options,
    };

    let port_name = match options.port.clone().or_else(find_usb_port) {
        Some(name) => name,
        None => {
            eprintln!("No USB serial device found; pass --port or check --list-ports");
            return Err("no serial port".into());
        }
    };

    eprint!("Connecting to {}...", port_name);
    io::stderr().flush()?;

    let mut port = serialport::new(&port_name, options.baud)
        .timeout(READ_TIMEOUT)
        .flow_control(serialport::FlowControl::None)
        .open()?;

    // Some CDC devices only start sending once DTR is set
    port.write_data_terminal_ready(true)?;
    eprintln!(" connected!");
    eprintln!("Waiting for reports (press the button on the node)...");

    read_reports(BufReader::new(port), &options)
}

/// POSTs line-protocol records to an InfluxDB `/write` endpoint
struct Uploader {
    agent: ureq::Agent,
    url: String,
}

impl Uploader {
    fn new(base_url: &str, database: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(UPLOAD_TIMEOUT).build(),
            url: write_url(base_url, database),
        }
    }

    fn upload(&self, record: &str) -> Result<(), Box<ureq::Error>> {
        self.agent
            .post(&self.url)
            .send_string(record)
            .map_err(Box::new)?;
        Ok(())
    }
}

/// `<base>/write?db=<database>`, tolerating a trailing slash on `base`
fn write_url(base_url: &str, database: &str) -> String {
    format!("{}/write?db={}", base_url.trim_end_matches('/'), database)
}

fn read_reports<R: BufRead>(
    mut reader: R,
    options: &Options,
) -> Result<(), Box<dyn std::error::Error>> {
    let uploader = options
        .influx_url
        .as_deref()
        .map(|url| Uploader::new(url, &options.database));
    if let Some(uploader) = &uploader {
        eprintln!("Uploading to {}", uploader.url);
    }

    let mut parser = ReportParser::new();
    let mut raw = Vec::new();
    let stdout = io::stdout();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                eprintln!("Device closed the connection");
                return Ok(());
            }
            Ok(_) => {}
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) => return Err(e.into()),
        }

        let line = String::from_utf8_lossy(&raw);
        match parser.feed(&line) {
            Feed::Completed(block) => {
                let timestamp = now_ns();
                if let Some(record) = render(&block, options, timestamp)? {
                    let mut out = stdout.lock();
                    out.write_all(record.as_bytes())?;
                    out.flush()?;
                }
                eprintln!("Report with {} readings at {}", block.len(), timestamp);

                let record =
                    block.to_line_protocol(&options.measurement, &options.location, timestamp);
                if let (Some(uploader), Some(record)) = (&uploader, record) {
                    match uploader.upload(&record) {
                        Ok(()) => eprintln!("Submitted at {}", timestamp / 1_000_000_000),
                        Err(e) => eprintln!("Upload failed: {}", e),
                    }
                }
            }
            Feed::Rejected(e) => {
                eprintln!("Skipping line {:?}: {}", line.trim(), e);
            }
            Feed::Started | Feed::Field(_) | Feed::Ignored => {}
        }
    }
}

fn render(
    block: &ReportBlock,
    options: &Options,
    timestamp_ns: u128,
) -> Result<Option<String>, serde_json::Error> {
    if options.json {
        let mut json = serde_json::to_string(block)?;
        json.push('\n');
        return Ok(Some(json));
    }
    Ok(block.to_line_protocol(&options.measurement, &options.location, timestamp_ns))
}

fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

fn parse_args(args: &[String]) -> Result<Command, ReadoutError> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--list-ports" => return Ok(Command::ListPorts),
            "--port" | "-p" => {
                let value = iter.next().ok_or(ReadoutError::MissingValue("--port"))?;
                options.port = Some(value.clone());
            }
            "--baud" | "-b" => {
                let value = iter.next().ok_or(ReadoutError::MissingValue("--baud"))?;
                options.baud = value
                    .parse()
                    .map_err(|_| ReadoutError::InvalidBaud(value.clone()))?;
            }
            "--location" | "-l" => {
                options.location = iter
                    .next()
                    .ok_or(ReadoutError::MissingValue("--location"))?
                    .clone();
            }
            "--measurement" | "-m" => {
                options.measurement = iter
                    .next()
                    .ok_or(ReadoutError::MissingValue("--measurement"))?
                    .clone();
            }
            "--json" => options.json = true,
            "--influx-url" => {
                let value = iter.next().ok_or(ReadoutError::MissingValue("--influx-url"))?;
                options.influx_url = Some(value.clone());
            }
            "--db" => {
                options.database = iter
                    .next()
                    .ok_or(ReadoutError::MissingValue("--db"))?
                    .clone();
            }
            other => return Err(ReadoutError::UnknownArgument(other.to_string())),
        }
    }

    Ok(Command::Read(options))
}

fn print_help() {
    println!("Sensor node readout");
    println!();
    println!("Options:");
    println!("  --list-ports           List serial ports and exit");
    println!("  -p, --port <PORT>      Serial port (default: first USB port)");
    println!("  -b, --baud <BAUD>      Baud rate (default: {})", DEFAULT_BAUD);
    println!("  -l, --location <NAME>  location tag (default: {})", DEFAULT_LOCATION);
    println!(
        "  -m, --measurement <M>  measurement name (default: {})",
        DEFAULT_MEASUREMENT
    );
    println!("  --json                 Print reports as JSON instead of line protocol");
    println!("  --influx-url <URL>     Also POST each report to <URL>/write");
    println!("  --db <DB>              InfluxDB database (default: {})", DEFAULT_DATABASE);
    println!("  -h, --help             Show this help");
}

fn list_ports() {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            eprintln!("Error listing ports: {}", e);
            return;
        }
    };

    println!("Serial ports ({}):", ports.len());
    for port in &ports {
        println!("  {}", describe_port(port));
    }
}

/// One-line summary; USB devices show VID:PID and product strings
fn describe_port(port: &serialport::SerialPortInfo) -> String {
    use serialport::SerialPortType;

    let kind = match &port.port_type {
        SerialPortType::UsbPort(usb) => {
            let mut kind = format!("usb {:04x}:{:04x}", usb.vid, usb.pid);
            for label in [&usb.manufacturer, &usb.product].into_iter().flatten() {
                kind.push(' ');
                kind.push_str(label);
            }
            kind
        }
        SerialPortType::BluetoothPort => "bluetooth".to_string(),
        SerialPortType::PciPort => "pci".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    };
    format!("{:<20} {}", port.port_name, kind)
}

fn find_usb_port() -> Option<String> {
    serialport::available_ports()
        .ok()?
        .into_iter()
        .find(|port| matches!(port.port_type, serialport::SerialPortType::UsbPort(_)))
        .map(|port| port.port_name)
}
