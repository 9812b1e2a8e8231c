//! `ClusterSource` backed by the `weka` command line client.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use wtop_core::{ClusterSnapshot, ClusterSource, ProviderError, StatsQuery};

pub struct WekaCli {
    binary: String,
    timeout: Duration,
}

impl WekaCli {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn run(&self, args: &[String]) -> Result<String, ProviderError> {
        let command = describe(&self.binary, args);
        debug!(%command, "spawning");
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProviderError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || drain(stdout));
        let stderr_reader = thread::spawn(move || drain(stderr));

        let status = match wait_until(&mut child, Instant::now() + self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!(%command, "killing timed out child");
                reap(&mut child);
                return Err(ProviderError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
            Err(source) => {
                reap(&mut child);
                return Err(ProviderError::Spawn { command, source });
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        check_output(command, status, &stdout, &stderr)
    }
}

const WAIT_POLL: Duration = Duration::from_millis(10);

/// Polls the child until it exits or `deadline` passes (`Ok(None)`).
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(WAIT_POLL.min(deadline - now));
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

impl ClusterSource for WekaCli {
    fn status(&self) -> Result<ClusterSnapshot, ProviderError> {
        let payload = self.run(&status_args())?;
        Ok(ClusterSnapshot::from_json(&payload)?)
    }

    fn stats(&self, query: &StatsQuery) -> Result<String, ProviderError> {
        self.run(&stats_args(query))
    }
}

fn check_output(
    command: String,
    status: ExitStatus,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<String, ProviderError> {
    if status.success() {
        Ok(String::from_utf8_lossy(stdout).into_owned())
    } else {
        Err(ProviderError::Exit {
            command,
            code: status.code(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        })
    }
}

/// Short label for messages: the binary plus its subcommands.
fn describe(binary: &str, args: &[String]) -> String {
    let subcommands: Vec<&str> = args
        .iter()
        .take_while(|arg| !arg.starts_with('-'))
        .map(String::as_str)
        .collect();
    if subcommands.is_empty() {
        binary.to_string()
    } else {
        format!("{binary} {}", subcommands.join(" "))
    }
}

pub fn status_args() -> Vec<String> {
    vec!["status".to_string(), "-J".to_string()]
}

pub fn stats_args(query: &StatsQuery) -> Vec<String> {
    let mut args = vec!["stats".to_string(), "realtime".to_string()];
    for filter in query.filters() {
        args.push("-F".to_string());
        args.push(filter);
    }
    args.extend(
        ["-f", "csv", "-R", "-o"]
            .iter()
            .map(|arg| arg.to_string()),
    );
    args.push(query.output_fields().join(","));
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtop_core::{GroupMode, MetricName};

    #[test]
    fn client_stats_argv() {
        let query = StatsQuery::hosts(GroupMode::Client, &[MetricName::Cpu, MetricName::Ops]);
        assert_eq!(
            stats_args(&query),
            vec![
                "stats",
                "realtime",
                "-F",
                "mode=client",
                "-F",
                "role=frontend",
                "-f",
                "csv",
                "-R",
                "-o",
                "hostname,cpu,ops"
            ]
        );
    }

    #[test]
    fn backend_detail_argv() {
        let query = StatsQuery::host_detail(GroupMode::Backend, "b1", &[MetricName::RdmaSent]);
        let args = stats_args(&query);
        assert_eq!(&args[2..4], &["-F", "mode=backend"]);
        assert_eq!(args.last().map(String::as_str), Some("node,hostname,role,rdmasend"));
    }

    #[test]
    fn labels_stop_at_flags() {
        assert_eq!(describe("weka", &status_args()), "weka status");
        let query = StatsQuery::hosts(GroupMode::Client, &[]);
        assert_eq!(describe("weka", &stats_args(&query)), "weka stats realtime");
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let cli = WekaCli::new("/nonexistent/wtop-weka", Duration::from_secs(1));
        let err = cli.status().expect_err("spawn should fail");
        assert!(matches!(err, ProviderError::Spawn { .. }));
    }

    #[cfg(unix)]
    fn fake_weka(script: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("wtop-weka-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("weka");
        std::fs::write(&path, script).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[cfg(unix)]
    #[test]
    fn timed_out_call_kills_the_child() {
        let marker = std::env::temp_dir().join(format!(
            "wtop-weka-marker-{}-{}",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_file(&marker);
        let script = fake_weka(&format!("#!/bin/sh\nsleep 2\ntouch '{}'\n", marker.display()));

        let cli = WekaCli::new(script.display().to_string(), Duration::from_millis(200));
        let started = Instant::now();
        let err = cli.status().expect_err("call should time out");
        assert!(matches!(err, ProviderError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));

        thread::sleep(Duration::from_secs(3));
        assert!(!marker.exists(), "child kept running after the timeout");
        let _ = std::fs::remove_dir_all(script.parent().expect("script dir"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_exit_reports_stderr() {
        let script = fake_weka("#!/bin/sh\necho 'not logged in' >&2\nexit 3\n");
        let cli = WekaCli::new(script.display().to_string(), Duration::from_secs(5));
        match cli.stats(&StatsQuery::hosts(GroupMode::Client, &[])) {
            Err(ProviderError::Exit { code, stderr, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "not logged in");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let _ = std::fs::remove_dir_all(script.parent().expect("script dir"));
    }
}
