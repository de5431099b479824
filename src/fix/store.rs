//! In-memory message and sequence-number persistence.
//!
//! Nothing here survives a process restart. That is the documented contract: on restart
//! an engine starts a fresh epoch with `next_outgoing`/`next_incoming` both reset to 1,
//! there is no durable resend log across restarts, and no on-disk format to version.
//! Within a running process this `Store` is the single source of truth the session
//! handler consults before trusting its own in-flight state, and is safe to share across
//! the read loop and heartbeat loop because its mutable parts are behind a [`Mutex`].

use crate::fix::mem::MsgBuf;
use crate::SessionConfig;
use anyhow::Result;
use chrono::offset::Utc;
use chrono::DateTime;

use std::sync::{Arc, Mutex};
use std::time::Instant;

struct Db {
    outgoing_messages: Vec<(Instant, u32, Arc<MsgBuf>)>,
    next_outgoing: u32,
    next_incoming: u32,
}

impl Db {
    fn new() -> Self {
        Self {
            outgoing_messages: Vec::new(),
            next_outgoing: 1,
            next_incoming: 1,
        }
    }
}

pub(super) struct Store {
    db: Mutex<Db>,
    begin_time: DateTime<Utc>,
    begin_instant: Instant,
}

impl Store {
    pub(super) fn build(_settings: &SessionConfig) -> Result<Store> {
        Ok(Self {
            db: Mutex::new(Db::new()),
            begin_instant: Instant::now(),
            begin_time: Utc::now(),
        })
    }

    pub(super) fn store_outgoing(
        &self,
        _epoch: Arc<String>,
        msg_seq_num: u32,
        send_instant: Instant,
        msg: Arc<MsgBuf>,
    ) -> Result<()> {
        self.db
            .lock()
            .unwrap()
            .outgoing_messages
            .push((send_instant, msg_seq_num, msg));
        Ok(())
    }

    pub(super) async fn get_sequences(&self, _epoch: Arc<String>) -> Result<(u32, u32)> {
        let db = self.db.lock().unwrap();
        Ok((db.next_incoming, db.next_outgoing))
    }

    pub(super) async fn get_prev_messages(
        &self,
        _epoch: Arc<String>,
        begin: u32,
        end: u32,
        _last: u32,
    ) -> Result<Vec<(u32, Vec<u8>)>> {
        let mut prev_messages: Vec<_> = {
            let db = self.db.lock().unwrap();
            db.outgoing_messages
                .iter()
                .filter(|(_, sequence, _)| (begin..=end).contains(sequence))
                .map(|(_, sequence, msg)| (*sequence, msg.0.clone()))
                .collect()
        };

        // comparison is reversed to get descending order, matching resend_messages' expectations
        prev_messages.sort_by(|(seq1, _), (seq2, _)| seq2.cmp(seq1));
        Ok(prev_messages)
    }

    pub(super) async fn set_sequences(
        &self,
        _epoch: Arc<String>,
        next_outgoing: u32,
        next_incoming: u32,
    ) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        db.next_outgoing = next_outgoing;
        db.next_incoming = next_incoming;
        Ok(())
    }

    pub(super) async fn last_send_time(&self, _epoch: Arc<String>) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .db
            .lock()
            .unwrap()
            .outgoing_messages
            .last()
            .map(|(send_instant, _, _)| {
                let since_begin = send_instant.duration_since(self.begin_instant);
                self.begin_time + since_begin
            }))
    }

    pub(super) async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    fn config() -> SessionConfig {
        SessionConfig::builder()
            .with_sender_comp_id("SENDER")
            .with_target_comp_id("TARGET")
            .with_socket_addr("127.0.0.1:0".parse().unwrap())
            .with_file_log_path("./target/test-logs".into())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn round_trips_sequences() {
        let settings = config();
        let store = Store::build(&settings).unwrap();
        let epoch = Arc::new(String::from("epoch"));
        assert_eq!(store.get_sequences(epoch.clone()).await.unwrap(), (1, 1));
        store.set_sequences(epoch.clone(), 4, 3).await.unwrap();
        assert_eq!(store.get_sequences(epoch).await.unwrap(), (3, 4));
    }

    #[tokio::test]
    async fn filters_prev_messages_by_range() {
        let settings = config();
        let store = Store::build(&settings).unwrap();
        let epoch = Arc::new(String::from("epoch"));
        for n in 1..=5u32 {
            store
                .store_outgoing(
                    epoch.clone(),
                    n,
                    Instant::now(),
                    Arc::new(MsgBuf(format!("msg{n}").into_bytes())),
                )
                .unwrap();
        }
        let prev = store.get_prev_messages(epoch, 2, 4, 5).await.unwrap();
        let seqs: Vec<u32> = prev.iter().map(|(s, _)| *s).collect();
        assert_eq!(seqs, vec![4, 3, 2]);
    }
}
