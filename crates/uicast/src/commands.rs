use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
pub use clap_complete::Shell;
use uicast_capture::StreamMode;

const LONG_ABOUT: &str = r#"uicast hosts live UI previews for an IDE.

The host binds two local sockets: a JSON command channel the IDE drives
(input events, device state, document loads) and a binary frame channel
that streams each finalized preview frame back.

WORKFLOW:
    1. Start the host: uicast start
    2. The IDE connects to the command socket and loads a document
    3. Rendered frames arrive on the frame socket as soon as the page
       settles
    4. The IDE sends Exit (or the process receives SIGTERM) to stop

EXAMPLES:
    # Default socket locations under $TMPDIR
    uicast start

    # Explicit sockets, region-refresh streaming
    uicast start --socket /tmp/preview.sock \
        --frame-socket /tmp/preview-frames.sock --stream-mode region

    # Present as a wearable
    uicast start --device-type wearable"#;

#[derive(Parser)]
#[command(name = "uicast")]
#[command(author, version)]
#[command(about = "IDE-driven UI preview host")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the preview host until the IDE sends Exit
    #[command(long_about = r#"Run the preview host until the IDE sends Exit.

Binds the command and frame sockets, then serves one IDE connection at
a time. Unset options fall back to the UICAST_* environment variables
and built-in defaults.

EXAMPLES:
    uicast start
    uicast start --stream-mode region
    uicast start --socket /tmp/preview.sock"#)]
    Start {
        /// Command channel socket path (default: $UICAST_SOCKET or $TMPDIR/uicast.sock)
        #[arg(long)]
        socket: Option<PathBuf>,

        /// Frame channel socket path (default: $UICAST_FRAME_SOCKET or $TMPDIR/uicast-frame.sock)
        #[arg(long)]
        frame_socket: Option<PathBuf>,

        /// Frame streaming mode
        #[arg(long, value_enum)]
        stream_mode: Option<StreamModeArg>,

        /// Device class reported to the IDE
        #[arg(long)]
        device_type: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(long_about = r#"Generate shell completion scripts for uicast.

EXAMPLES:
    uicast completions bash > /etc/bash_completion.d/uicast
    uicast completions zsh > ~/.zfunc/_uicast
    uicast completions fish > ~/.config/fish/completions/uicast.fish"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamModeArg {
    /// Ship the whole frame every time
    Full,
    /// Ship only the changed rectangle when the runtime reports one
    Region,
}

impl From<StreamModeArg> for StreamMode {
    fn from(arg: StreamModeArg) -> Self {
        match arg {
            StreamModeArg::Full => StreamMode::FullFrame,
            StreamModeArg::Region => StreamMode::Region,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_accepts_all_flags() {
        let cli = Cli::parse_from([
            "uicast",
            "start",
            "--socket",
            "/tmp/a.sock",
            "--frame-socket",
            "/tmp/b.sock",
            "--stream-mode",
            "region",
            "--device-type",
            "wearable",
        ]);
        match cli.command {
            Commands::Start {
                socket,
                frame_socket,
                stream_mode,
                device_type,
            } => {
                assert_eq!(socket, Some(PathBuf::from("/tmp/a.sock")));
                assert_eq!(frame_socket, Some(PathBuf::from("/tmp/b.sock")));
                assert_eq!(stream_mode, Some(StreamModeArg::Region));
                assert_eq!(device_type.as_deref(), Some("wearable"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_start_flags_are_optional() {
        let cli = Cli::parse_from(["uicast", "start"]);
        match cli.command {
            Commands::Start {
                socket,
                frame_socket,
                stream_mode,
                device_type,
            } => {
                assert_eq!(socket, None);
                assert_eq!(frame_socket, None);
                assert_eq!(stream_mode, None);
                assert_eq!(device_type, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_stream_mode_arg_maps_to_streamer_mode() {
        assert_eq!(StreamMode::from(StreamModeArg::Full), StreamMode::FullFrame);
        assert_eq!(StreamMode::from(StreamModeArg::Region), StreamMode::Region);
    }
}
