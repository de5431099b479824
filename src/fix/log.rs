//! Append-only log sinks.
//!
//! Two independent logs are kept, mirroring what a FIX engine operator actually wants
//! to grep through later: a byte-exact record of every message that crossed the wire
//! (for replay/dispute resolution), and a human-readable narrative of session-level
//! events (connects, logons, resends, errors). Each sink owns a background task reached
//! over an unbounded mpsc channel, so a slow disk write never blocks the read loop or
//! the heartbeat loop.

use crate::fix::mem::MsgBuf;
use crate::fix::SessionError;
use crate::SessionConfig;

use chrono::offset::Local;
use chrono::{DateTime, Duration};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

use std::time::Instant;

use anyhow::Result;

const LOG_FILE_TYPE: &str = "log";

enum LoggerRequest {
    Log(String, Instant),
    Disconnect(oneshot::Sender<Result<(), SessionError>>),
}

pub(super) struct FileLogger {
    sender: mpsc::UnboundedSender<LoggerRequest>,
}

pub(super) trait Logger {
    fn log_message(&mut self, msg: &MsgBuf) -> Result<(), SessionError>;
}

impl Logger for FileLogger {
    fn log_message(&mut self, buf: &MsgBuf) -> Result<(), SessionError> {
        // Debug, not Display: SOH (0x01) prints as `|` so the file log stays grep/eyeball-able.
        let req = LoggerRequest::Log(format!("{:?}", buf), Instant::now());
        self.sender.send(req).map_err(to_io_err)?;
        Ok(())
    }
}

impl FileLogger {
    async fn build_named(settings: &SessionConfig, file_name: String) -> Result<FileLogger> {
        let log_path = settings.file_log_path();
        std::fs::create_dir_all(log_path)?;
        let logs = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path.join(file_name).with_extension(LOG_FILE_TYPE))
            .await?;

        Ok(FileLogger::spawn(logs))
    }

    /// The message log: one line per inbound or outbound message, verbatim.
    pub(super) async fn build_messages(settings: &SessionConfig) -> Result<FileLogger> {
        let sendercompid = settings.expected_sender_comp_id();
        FileLogger::build_named(settings, format!("{sendercompid}-fixMessages")).await
    }

    /// The event log: one line per session-level occurrence (connect, logon, resend, error).
    pub(super) async fn build_events(settings: &SessionConfig) -> Result<FileLogger> {
        let sendercompid = settings.expected_sender_comp_id();
        FileLogger::build_named(settings, format!("{sendercompid}-session")).await
    }

    fn spawn(mut logs: File) -> FileLogger {
        let (sender, mut receiver) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let begin_time = Local::now();
            let begin_instant = Instant::now();
            while let Some(req) = receiver.recv().await {
                match req {
                    LoggerRequest::Log(msg, instant) => {
                        let send_time = match Duration::from_std(instant.duration_since(begin_instant)) {
                            Ok(d) => begin_time + d,
                            Err(_) => Local::now(),
                        };
                        if let Err(e) = log_message(&mut logs, msg, send_time).await {
                            eprintln!("error logging message: {e:?}")
                        }
                    }
                    LoggerRequest::Disconnect(sender) => {
                        let resp = disconnect(&mut logs).await;
                        let _ = sender.send(resp);
                    }
                }
            }
        });

        FileLogger { sender }
    }

    /// Records a session-level event line (connect, logon, resend, error, ...).
    pub(super) fn log_event(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let req = LoggerRequest::Log(text.into(), Instant::now());
        self.sender.send(req).map_err(to_io_err)?;
        Ok(())
    }

    pub(super) async fn disconnect(&mut self) -> Result<(), SessionError> {
        let (sender, receiver) = oneshot::channel();
        let req = LoggerRequest::Disconnect(sender);
        self.sender.send(req).map_err(to_io_err)?;
        receiver.await.map_err(to_io_err)?
    }
}

async fn log_message(logs: &mut File, buf: String, time: DateTime<Local>) -> Result<(), SessionError> {
    logs.write_all(format!("{} : {}\n", message_stamp(time), buf).as_bytes())
        .await?;
    logs.flush().await?;
    Ok(())
}

async fn disconnect(logs: &mut File) -> Result<(), SessionError> {
    logs.flush().await?;
    Ok(())
}

fn message_stamp(time: DateTime<Local>) -> String {
    time.format("%Y%m%d-%H:%M:%S%.9f").to_string()
}

fn to_io_err<E>(e: E) -> std::io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    std::io::Error::new(std::io::ErrorKind::Other, e)
}
