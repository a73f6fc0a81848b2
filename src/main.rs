//! Purpose: `carton` CLI entry point.
//! Role: Binary crate root; parses args, runs the server, emits diagnostics.
//! Invariants: Errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.

use std::io;
use std::net::SocketAddr;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};

mod serve;

use carton::api::{Error, ErrorKind, to_exit_code};

#[derive(Parser)]
#[command(
    name = "carton",
    version,
    about = "In-memory cart-item CRUD service over HTTP",
    after_help = r#"EXAMPLES
  $ carton serve
  $ carton serve --bind 127.0.0.1:9800
  $ curl http://127.0.0.1:9800/cart-items?maxPrice=5
  $ curl -X POST -H 'content-type: application/json' \
      --data '{"product":"Soap","price":2,"quantity":5}' \
      http://127.0.0.1:9800/cart-items"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Serve the cart-item collection over HTTP (loopback default)",
        after_help = r#"NOTES
  - State is in-memory only and resets on restart
  - Loopback is the default; non-loopback binds require --allow-non-loopback
  - Use --no-seed to start from an empty collection"#
    )]
    Serve {
        #[arg(long, default_value = "127.0.0.1:9800", help = "Bind address (host:port)")]
        bind: String,
        #[arg(long, help = "Allow binding a non-loopback address")]
        allow_non_loopback: bool,
        #[arg(
            long,
            default_value_t = 1024 * 1024,
            help = "Reject request bodies larger than this many bytes"
        )]
        max_body_bytes: u64,
        #[arg(long, help = "Start with an empty collection instead of the sample items")]
        no_seed: bool,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            bind,
            allow_non_loopback,
            max_body_bytes,
            no_seed,
        } => {
            let bind: SocketAddr = bind.parse().map_err(|_| {
                Error::new(ErrorKind::Usage)
                    .with_message("invalid bind address")
                    .with_hint("Use a host:port value like 127.0.0.1:9800.")
            })?;
            let config = serve::ServeConfig {
                bind,
                allow_non_loopback,
                max_body_bytes,
                seed: !no_seed,
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(serve::serve(config))
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "carton", &mut io::stdout());
            Ok(())
        }
    }
}

fn emit_error(err: &Error) {
    let mut body = Map::new();
    body.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    body.insert(
        "message".to_string(),
        json!(err.message().unwrap_or("error")),
    );
    if let Some(hint) = err.hint() {
        body.insert("hint".to_string(), json!(hint));
    }
    eprintln!("{}", json!({ "error": Value::Object(body) }));
}
