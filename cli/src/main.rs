mod input;

use std::rc::Rc;
use std::time::Duration;

use canvas::raster::Raster;
use clap::{Args, Parser, Subcommand};
use client::chat::ChatLine;
use client::config::{DEFAULT_BASE_URL, EchoPolicy};
use client::driver::{self, Command as DriverCommand, RunExit, Step};
use client::frame::FrameClock;
use client::net::api::{self, ApiError};
use client::net::{self, ConnectError, Connection, Incoming};
use client::whiteboard::{Applied, Whiteboard};
use client::{ClientConfig, Identity, RoomError};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "drawsync=info,client=info";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing auth token; pass --token or set DRAWSYNC_TOKEN")]
    MissingToken,
    #[error("login failed: {0}")]
    Login(#[from] ApiError),
    #[error("connect failed: {0}")]
    Connect(#[from] ConnectError),
    #[error("room: {0}")]
    Room(#[from] RoomError),
    #[error("chat message not sent")]
    ChatNotSent,
    #[error("cannot read input: {0}")]
    Input(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("connection lost: {0}")]
    Disconnected(String),
}

#[derive(Parser, Debug)]
#[command(name = "drawsync", about = "Shared whiteboard client")]
struct Cli {
    #[arg(long, env = "DRAWSYNC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "DRAWSYNC_TOKEN")]
    token: Option<String>,

    /// `receipt` paints strokes when the server echoes them; `local` on send.
    #[arg(long, env = "DRAWSYNC_ECHO", default_value = "receipt")]
    echo: EchoPolicy,

    #[arg(long, env = "DRAWSYNC_CONNECT_TIMEOUT_MS", default_value_t = 5000)]
    connect_timeout_ms: u64,

    #[arg(long, env = "DRAWSYNC_FRAME_INTERVAL_MS", default_value_t = 16)]
    frame_interval_ms: u64,

    /// Chat display name.
    #[arg(long, env = "DRAWSYNC_NAME")]
    name: Option<String>,

    /// Chat email, used for "is this me" and sender colors.
    #[arg(long, env = "DRAWSYNC_EMAIL")]
    sender_email: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DRAWSYNC_PASSWORD")]
        password: String,
    },
    /// Create a room, print its id, then watch it.
    Create,
    /// Join a room and print chat until Ctrl-C.
    Watch { room: String },
    /// Join a room and send one chat message.
    Say { room: String, text: String },
    /// Stream JSONL pointer events into a room.
    Draw(DrawArgs),
}

#[derive(Args, Debug)]
struct DrawArgs {
    room: String,

    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    /// Start with the eraser instead of the pen.
    #[arg(long, default_value_t = false)]
    erase: bool,
}

struct CliContext {
    config: ClientConfig,
    token: Option<String>,
    identity: Identity,
}

/// One live connection and the whiteboard fed by it.
struct Session {
    connection: Connection,
    incoming: Incoming,
    clock: FrameClock,
    whiteboard: Whiteboard<Raster>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = CliContext {
        config: ClientConfig {
            base_url: cli.base_url,
            connect_timeout: Duration::from_millis(cli.connect_timeout_ms),
            frame_interval: Duration::from_millis(cli.frame_interval_ms),
            echo_policy: cli.echo,
        },
        token: cli.token,
        identity: Identity::new(cli.name.as_deref(), cli.sender_email.as_deref()),
    };

    match cli.command {
        Command::Login { email, password } => run_login(&ctx, &email, &password).await,
        Command::Create => run_watch(&ctx, None).await,
        Command::Watch { room } => run_watch(&ctx, Some(&room)).await,
        Command::Say { room, text } => run_say(&ctx, &room, text).await,
        Command::Draw(args) => run_draw(&ctx, args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run_login(ctx: &CliContext, email: &str, password: &str) -> Result<(), CliError> {
    let login = api::login(&ctx.config, email, password).await?;
    let identity = login.identity(email);
    let rendered = serde_json::to_string_pretty(&json!({
        "token": login.token,
        "email": identity.email(),
        "name": identity.display_name,
    }))?;
    println!("{rendered}");
    Ok(())
}

async fn connect(ctx: &CliContext) -> Result<Session, CliError> {
    let token = ctx.token.as_deref().ok_or(CliError::MissingToken)?;
    let (connection, incoming) = net::open(&ctx.config, token).await?;
    let clock = FrameClock::new(ctx.config.frame_interval);
    let whiteboard = Whiteboard::new(
        Rc::new(connection.clone()),
        Rc::new(clock.clone()),
        Raster::default(),
        ctx.identity.clone(),
        ctx.config.echo_policy,
    );
    Ok(Session { connection, incoming, clock, whiteboard })
}

/// `None` creates a fresh room and prints its id first.
async fn run_watch(ctx: &CliContext, room: Option<&str>) -> Result<(), CliError> {
    let mut session = connect(ctx).await?;
    let room_id = match room {
        Some(room) => session.whiteboard.join(room)?,
        None => {
            let room_id = session.whiteboard.create()?;
            println!("{room_id}");
            room_id
        }
    };
    info!(room = %room_id, "watching; Ctrl-C to stop");

    let (tx, mut commands) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for Ctrl-C");
            return;
        }
        if tx.send(DriverCommand::Close).is_err() {
            info!("event loop already stopped");
        }
    });

    let exit = driver::run(
        &mut session.whiteboard,
        &session.clock,
        &mut session.incoming,
        &mut commands,
        print_step,
    )
    .await;
    finish(session, exit).await
}

async fn run_say(ctx: &CliContext, room: &str, text: String) -> Result<(), CliError> {
    let mut session = connect(ctx).await?;
    session.whiteboard.join(room)?;
    session.whiteboard.set_compose(text);
    let sent = session.whiteboard.send_chat();
    net::close(session.connection).await;
    if sent { Ok(()) } else { Err(CliError::ChatNotSent) }
}

async fn run_draw(ctx: &CliContext, args: DrawArgs) -> Result<(), CliError> {
    let reader: Box<dyn AsyncRead + Send + Unpin> = if args.input == "-" {
        Box::new(tokio::io::stdin())
    } else {
        Box::new(tokio::fs::File::open(&args.input).await?)
    };

    let mut session = connect(ctx).await?;
    session.whiteboard.join(&args.room)?;
    session.whiteboard.set_erasing(args.erase);

    let (tx, mut commands) = mpsc::unbounded_channel();
    let feeder = tokio::spawn(feed_script(reader, tx));

    let mut segments = 0_usize;
    let exit = driver::run(
        &mut session.whiteboard,
        &session.clock,
        &mut session.incoming,
        &mut commands,
        |whiteboard, step| {
            if let Step::Frame { sent } = step {
                segments = segments.saturating_add(*sent);
            }
            print_step(whiteboard, step);
        },
    )
    .await;

    let skipped = match feeder.await {
        Ok(result) => result?,
        Err(error) => {
            warn!(%error, "input reader stopped");
            0
        }
    };
    eprintln!("draw complete: room={} segments={segments} skipped={skipped}", args.room);
    finish(session, exit).await
}

/// Forward script lines as driver commands, then ask the loop to close.
/// Returns the number of unparsable lines.
async fn feed_script(
    reader: Box<dyn AsyncRead + Send + Unpin>,
    tx: mpsc::UnboundedSender<DriverCommand>,
) -> Result<usize, CliError> {
    let mut lines = BufReader::new(reader).lines();
    let mut skipped = 0_usize;
    let mut number = 0_usize;
    while let Some(line) = lines.next_line().await? {
        number = number.saturating_add(1);
        let command = match input::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                warn!(line = number, %error, "skipping input line");
                skipped = skipped.saturating_add(1);
                continue;
            }
        };
        if tx.send(command).is_err() {
            return Ok(skipped);
        }
    }
    if tx.send(DriverCommand::Close).is_err() {
        info!("event loop stopped before end of input");
    }
    Ok(skipped)
}

fn print_step(whiteboard: &Whiteboard<Raster>, step: &Step) {
    match step {
        Step::Applied(Applied::Chat(message)) => {
            println!("{}", ChatLine::new(message, whiteboard.identity()));
        }
        Step::Applied(Applied::Snapshot { chats, .. }) => {
            for line in whiteboard.chat().lines().iter().take(*chats) {
                println!("{line}");
            }
        }
        _ => {}
    }
}

async fn finish(session: Session, exit: RunExit) -> Result<(), CliError> {
    let (painted, total) = coverage(session.whiteboard.surface());
    net::close(session.connection).await;
    #[allow(clippy::cast_precision_loss)]
    let percent = if total == 0 { 0.0 } else { painted as f64 * 100.0 / total as f64 };
    eprintln!("surface: {painted}/{total} px painted ({percent:.2}%)");

    match exit {
        RunExit::Closed | RunExit::CommandsClosed => Ok(()),
        RunExit::Disconnected { reason } => Err(CliError::Disconnected(reason)),
    }
}

fn coverage(raster: &Raster) -> (usize, usize) {
    (raster.painted_pixels(), raster.pixels().len())
}
