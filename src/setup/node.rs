//! Supervision of the local chain node process.
//!
//! The node is an external binary (`geth`-compatible). We spawn it mining
//! on the configured network with the etherbase unlocked, capture its
//! output to a log file, and leave restart decisions to the provisioning
//! loop.

use std::path::PathBuf;
use std::process::Stdio;

use alloy_primitives::Address;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

/// Everything needed to launch the node for one etherbase account.
#[derive(Debug, Clone)]
pub struct NodeOptions {
    pub binary: PathBuf,
    pub etherbase: Address,
    pub network_id: u64,
    pub peer_port: u16,
    pub rpc_port: u16,
    pub datadir: PathBuf,
    pub log_path: PathBuf,
    /// Echo node output to the operator console as well as the log file.
    pub verbose: bool,
}

impl NodeOptions {
    /// Options derived from the config for a given etherbase.
    pub fn from_config(config: &Config, etherbase: Address, verbose: bool) -> Self {
        Self {
            binary: PathBuf::from("geth"),
            etherbase,
            network_id: config.node.network_id,
            peer_port: config.node.peer_port,
            rpc_port: config.node.rpc_port,
            datadir: config.datadir(),
            log_path: config.node_log_path(),
            verbose,
        }
    }

    /// Command-line flags for the node binary.
    pub fn flags(&self) -> Vec<String> {
        let etherbase = format!("{}", self.etherbase);
        vec![
            "--etherbase".into(),
            etherbase.clone(),
            "--unlock".into(),
            etherbase,
            "--mine".into(),
            "--port".into(),
            self.peer_port.to_string(),
            "--rpc".into(),
            "--rpcport".into(),
            self.rpc_port.to_string(),
            "--rpccorsdomain".into(),
            "http://localhost:8080".into(),
            "--rpcapi".into(),
            "db,eth,net,web3,miner".into(),
            "--nodiscover".into(),
            "--maxpeers".into(),
            "64".into(),
            "--networkid".into(),
            self.network_id.to_string(),
            "--datadir".into(),
            self.datadir.display().to_string(),
            "--password".into(),
            self.datadir.join(".password").display().to_string(),
        ]
    }
}

/// A spawned node process with its output drained to a log file.
pub struct NodeProcess {
    child: Child,
}

impl NodeProcess {
    /// Spawn the node and start draining its output.
    pub async fn spawn(options: &NodeOptions) -> Result<Self> {
        info!(
            binary = %options.binary.display(),
            network_id = options.network_id,
            peer_port = options.peer_port,
            rpc_port = options.rpc_port,
            "spawning node"
        );

        let mut child = Command::new(&options.binary)
            .args(options.flags())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::NodeProcess(format!(
                    "failed to spawn {}: {e}",
                    options.binary.display()
                ))
            })?;

        if let Some(parent) = options.log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let log = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&options.log_path)
            .await?;
        info!(path = %options.log_path.display(), "node log file");

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain(stdout, log.try_clone().await?, "stdout", options.verbose));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain(stderr, log, "stderr", options.verbose));
        }

        Ok(Self { child })
    }

    /// OS process id, when the process is still running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether the process has exited, and with what status.
    pub fn try_status(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|e| Error::NodeProcess(e.to_string()))
    }

    /// Shut the node down.
    pub async fn kill(&mut self) -> Result<()> {
        info!("shutting down node");
        self.child
            .start_kill()
            .map_err(|e| Error::NodeProcess(e.to_string()))?;
        self.child
            .wait()
            .await
            .map_err(|e| Error::NodeProcess(e.to_string()))?;
        Ok(())
    }
}

/// Copy one output stream of the child to the log file, line by line.
async fn drain(
    stream: impl AsyncRead + Unpin,
    mut log: tokio::fs::File,
    label: &'static str,
    verbose: bool,
) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if verbose {
            debug!(source = label, line = %line, "node output");
        }
        let entry = format!("{label}: {line}\n");
        if log.write_all(entry.as_bytes()).await.is_err() {
            break;
        }
    }
}
