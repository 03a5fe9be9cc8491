//! Command-line front end for the single-address wallet.
//!
//! Derives the wallet address from a WIF key, queries its unspent outputs,
//! creates signed transactions and decodes raw transaction hex. Keys are read
//! from `--wif` or prompted for without echo.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use coinkit_core::address::Address;
use coinkit_core::coin::Coin;
use coinkit_core::constants::COIN;
use coinkit_core::crypto::PrivateKey;
use coinkit_core::types::{self, total_value, UnspentOutput};
use coinkit_wallet::{UtxoWallet, WalletConfig};
use tracing::info;

/// Single-address UTXO wallet.
#[derive(Parser)]
#[command(name = "coinkit")]
#[command(version, about = "Build and sign transactions for a single-address UTXO wallet.")]
struct Cli {
    /// Config file (default: <config dir>/coinkit/config.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Coin override (bitcoin, testnet, litecoin).
    #[arg(long, global = true)]
    coin: Option<Coin>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new private key.
    Keygen,
    /// Show the wallet address for a key.
    Address(KeyArgs),
    /// Query the wallet's unspent outputs from the provider.
    Balance(KeyArgs),
    /// Create and sign a payment; prints the raw transaction hex.
    Send(SendArgs),
    /// Decode a raw transaction.
    Decode(DecodeArgs),
}

#[derive(Args)]
struct KeyArgs {
    /// WIF private key. If not provided, will prompt securely.
    #[arg(short, long)]
    wif: Option<String>,
}

#[derive(Args)]
struct SendArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Recipient address.
    #[arg(short, long)]
    to: String,

    /// Amount to send in satoshis.
    #[arg(short, long)]
    amount: u64,

    /// JSON file of unspent outputs to spend instead of querying the provider.
    #[arg(short, long)]
    utxos: Option<PathBuf>,

    /// Fee rate override in satoshis per byte.
    #[arg(long)]
    fee_per_byte: Option<u64>,
}

#[derive(Args)]
struct DecodeArgs {
    /// Raw transaction hex.
    hex: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config, cli.coin)?;

    match cli.command {
        Commands::Keygen => keygen(&config),
        Commands::Address(args) => show_address(args, &config),
        Commands::Balance(args) => balance(args, &config).await,
        Commands::Send(args) => send(args, config).await,
        Commands::Decode(args) => decode(args, &config),
    }
}

/// Generate a fresh compressed key for the configured coin.
fn keygen(config: &WalletConfig) -> Result<()> {
    let key = PrivateKey::generate(config.coin);
    println!("\n=== KEY GENERATED ===");
    println!("Coin: {}", key.coin());
    println!("Address: {}", key.address());
    println!("WIF: {}", key.to_wif());
    println!("\nWARNING: Anyone with this WIF can spend the funds at this address.");
    Ok(())
}

fn show_address(args: KeyArgs, config: &WalletConfig) -> Result<()> {
    let key = read_key(args.wif, config)?;
    println!("{}", key.address());
    Ok(())
}

/// Fetch and summarize the unspent outputs at the key's address.
async fn balance(args: KeyArgs, config: &WalletConfig) -> Result<()> {
    let key = read_key(args.wif, config)?;
    let wallet = UtxoWallet::from_config(key, config).context("Failed to create wallet")?;

    let utxos = wallet
        .reload_balance()
        .await
        .context("Failed to fetch unspent outputs")?;
    let total = total_value(&utxos).context("Balance overflow")?;

    println!("Address: {}", wallet.address());
    println!("Unspent outputs: {}", utxos.len());
    for utxo in &utxos {
        println!("  {}  {} sat", utxo.outpoint, utxo.value);
    }
    println!("Balance: {} sat ({})", total, format_coins(total));
    Ok(())
}

/// Create and sign a payment, printing the transaction hex on stdout.
async fn send(args: SendArgs, mut config: WalletConfig) -> Result<()> {
    if let Some(rate) = args.fee_per_byte {
        config.fee_per_byte = rate;
    }
    let key = read_key(args.key.wif, &config)?;
    let to: Address = args
        .to
        .parse()
        .with_context(|| format!("Invalid recipient address: {}", args.to))?;

    let wallet = UtxoWallet::from_config(key, &config).context("Failed to create wallet")?;

    let utxos = match &args.utxos {
        Some(path) => read_utxo_file(path)?,
        None => wallet
            .reload_balance()
            .await
            .context("Failed to fetch unspent outputs")?,
    };
    info!(candidates = utxos.len(), "loaded unspent outputs");

    let created = wallet
        .create_transaction_detailed(&to, args.amount, &utxos)
        .context("Failed to create transaction")?;

    eprintln!("\n=== TRANSACTION CREATED ===");
    eprintln!("TxID: {}", created.txid);
    eprintln!("To: {to}");
    eprintln!("Amount: {} sat", args.amount);
    eprintln!("Fee: {} sat", created.fee);
    if created.change > 0 {
        eprintln!("Change: {} sat to {}", created.change, wallet.address());
    }
    eprintln!("Inputs: {}", created.spent.len());
    println!("{}", created.hex);
    Ok(())
}

/// Pretty-print a raw transaction.
fn decode(args: DecodeArgs, config: &WalletConfig) -> Result<()> {
    let tx = types::decode_hex(&args.hex).context("Failed to decode transaction")?;

    println!("TxID: {}", tx.compute_txid());
    println!("Version: {}", tx.version.0);
    println!("Size: {} bytes", tx.total_size());
    println!("Inputs ({}):", tx.input.len());
    for (i, input) in tx.input.iter().enumerate() {
        println!("  [{i}] {}", input.previous_output);
        println!("      script_sig: {}", hex::encode(input.script_sig.as_bytes()));
        println!("      sequence: {:#010x}", input.sequence.to_consensus_u32());
    }
    println!("Outputs ({}):", tx.output.len());
    for (i, output) in tx.output.iter().enumerate() {
        let dest = Address::from_script(&output.script_pubkey, config.coin)
            .map(|a| a.to_string())
            .unwrap_or_else(|| "non-standard".to_string());
        println!("  [{i}] {} sat -> {dest}", output.value.to_sat());
        println!("      script_pubkey: {}", hex::encode(output.script_pubkey.as_bytes()));
    }
    println!("Lock time: {}", tx.lock_time.to_consensus_u32());
    match types::check_sanity(&tx) {
        Ok(()) => println!("Sanity: ok"),
        Err(e) => println!("Sanity: {e}"),
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>, coin: Option<Coin>) -> Result<WalletConfig> {
    let path = path.or_else(WalletConfig::default_path);
    let mut config = WalletConfig::load(path.as_deref()).context("Failed to load config")?;
    if let Some(coin) = coin {
        config.coin = coin;
    }
    Ok(config)
}

/// Read the key from the argument or prompt, and check it matches the coin.
fn read_key(wif: Option<String>, config: &WalletConfig) -> Result<PrivateKey> {
    let wif = match wif {
        Some(w) => w,
        None => prompt_secret("WIF private key")?,
    };
    let key = PrivateKey::from_wif(&wif).context("Invalid WIF key")?;
    if key.coin() != config.coin {
        bail!(
            "Key is for {} but the configured coin is {} (use --coin {})",
            key.coin(),
            config.coin,
            key.coin()
        );
    }
    Ok(key)
}

fn read_utxo_file(path: &Path) -> Result<Vec<UnspentOutput>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid UTXO JSON in {}", path.display()))
}

/// Prompt for a secret securely (no echo).
fn prompt_secret(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", prompt)).context("Failed to read secret")
}

/// Whole-coin amount for display.
fn format_coins(sats: u64) -> String {
    format!("{}.{:08}", sats / COIN, sats % COIN)
}
