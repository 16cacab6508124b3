//! Command-line arguments and command dispatch.

use std::io::Read;
use std::path::PathBuf;

use borica::{
    GatewayRequest, GatewayTimestamp, Operation, ProtocolVersion, ResponseParser,
    TransactionRequest,
};
use clap::{Args, Parser, Subcommand};

use crate::config::{CliConfig, DEFAULT_CONFIG};
use crate::error::CliError;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "borica",
    version,
    about = "Build signed eBorica request URLs and check gateway responses"
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "BORICA_CONFIG", default_value = DEFAULT_CONFIG, global = true)]
    pub config: PathBuf,

    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new payment
    Register(RegisterArgs),
    /// Ask for the status of a payment
    Status(TransactionArgs),
    /// Register a delayed authorization
    RegisterDelayed(TransactionArgs),
    /// Complete a delayed authorization
    CompleteDelayed(TransactionArgs),
    /// Reverse a delayed authorization
    ReverseDelayed(TransactionArgs),
    /// Reverse a payment
    Reverse(TransactionArgs),
    /// Decode and verify a gateway response
    Parse(ParseArgs),
}

/// Transaction fields shared by every request command.
#[derive(Args, Debug)]
pub struct TransactionArgs {
    /// Amount in major units, e.g. `12.50`.
    #[arg(long)]
    pub amount: String,

    /// Merchant order ID (1 to 15 bytes).
    #[arg(long)]
    pub order_id: String,

    /// Order description (1 to 125 bytes).
    #[arg(long)]
    pub description: String,

    /// Currency code; defaults to the configured currency.
    #[arg(long)]
    pub currency: Option<String>,

    /// Protocol version (`1.0`, `1.1` or `2.0`); defaults to the configured one.
    #[arg(long = "protocol")]
    pub protocol_version: Option<String>,
}

/// Arguments of `register`.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Transaction fields.
    #[command(flatten)]
    pub transaction: TransactionArgs,

    /// One-time ticket, sent with protocol `2.0` only.
    #[arg(long)]
    pub ticket: Option<String>,
}

/// Arguments of `parse`.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Base64 response; read from stdin when omitted.
    pub message: Option<String>,
}

impl TransactionArgs {
    fn request(&self, client: &GatewayRequest) -> Result<TransactionRequest, CliError> {
        let mut builder = client
            .transaction()?
            .amount(&self.amount)?
            .order_id(self.order_id.as_str())?
            .description(self.description.as_str())?;
        if let Some(currency) = &self.currency {
            builder = builder.currency(currency)?;
        }
        Ok(builder.build()?)
    }

    fn version(&self, default: ProtocolVersion) -> ProtocolVersion {
        self.protocol_version
            .as_deref()
            .map_or(default, ProtocolVersion::from)
    }
}

/// Runs `command` against `config` and returns what should be printed.
///
/// # Errors
///
/// Returns an error if the key material cannot be loaded, the arguments are
/// invalid, or (for `parse`) the response cannot be decoded.
pub fn run(command: &Command, config: &CliConfig) -> Result<String, CliError> {
    let (operation, args) = match command {
        Command::Parse(args) => return parse(args, config),
        Command::Register(args) => (
            Operation::Register {
                one_time_ticket: args.ticket.clone(),
            },
            &args.transaction,
        ),
        Command::Status(args) => (Operation::Status, args),
        Command::RegisterDelayed(args) => (Operation::RegisterDelayed, args),
        Command::CompleteDelayed(args) => (Operation::CompleteDelayed, args),
        Command::ReverseDelayed(args) => (Operation::ReverseDelayed, args),
        Command::Reverse(args) => (Operation::Reverse, args),
    };

    let client = GatewayRequest::new(&config.merchant)?;
    let request = args.request(&client)?;
    let version = args.version(client.protocol_version());
    tracing::info!(
        endpoint = %operation.endpoint(),
        order_id = request.order_id(),
        version = %version,
        "building request"
    );
    Ok(client.url_for(&operation, &request, version, GatewayTimestamp::now())?)
}

fn parse(args: &ParseArgs, config: &CliConfig) -> Result<String, CliError> {
    let certificate = config
        .certificate
        .as_ref()
        .ok_or(CliError::MissingCertificate)?;

    let message = match &args.message {
        Some(message) => message.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(CliError::Stdin)?;
            buf
        }
    };

    let parser = ResponseParser::new(&certificate.certificate);
    let response = parser.parse(&message)?;
    if !response.signature_ok() {
        tracing::warn!(verification = %response.verification(), "response signature not trusted");
    }
    Ok(serde_json::to_string_pretty(&response)?)
}
