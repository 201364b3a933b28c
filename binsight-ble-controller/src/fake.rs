//! Scripted in-memory transport for tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use uuid::Uuid;

use crate::transport::{Advertisement, Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeLink {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Write {
    pub service: Uuid,
    pub characteristic: Uuid,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    scans: RefCell<VecDeque<Result<Vec<Advertisement>, TransportError>>>,
    connect_failures: Cell<u32>,
    services: Vec<Uuid>,
    reads: RefCell<HashMap<Uuid, VecDeque<Result<Vec<u8>, TransportError>>>>,
    fail_writes: Cell<bool>,
    pub scans_run: Cell<u32>,
    pub connects: Cell<u32>,
    pub disconnected: RefCell<Vec<String>>,
    pub reads_run: Cell<u32>,
    pub writes_run: Cell<u32>,
    pub writes: RefCell<Vec<Write>>,
}

pub(crate) fn named(name: &str, address: &str) -> Advertisement {
    Advertisement {
        name: Some(name.to_string()),
        address: address.to_string(),
    }
}

pub(crate) fn anonymous(address: &str) -> Advertisement {
    Advertisement {
        name: None,
        address: address.to_string(),
    }
}

fn failure() -> TransportError {
    TransportError::Timeout(Duration::from_secs(1))
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next discovery window
    pub fn scan(self, devices: Vec<Advertisement>) -> Self {
        self.scans.borrow_mut().push_back(Ok(devices));
        self
    }

    pub fn failing_scan(self) -> Self {
        self.scans.borrow_mut().push_back(Err(failure()));
        self
    }

    /// Fail the next `n` connect calls
    pub fn connect_failures(self, n: u32) -> Self {
        self.connect_failures.set(n);
        self
    }

    pub fn service(mut self, uuid: Uuid) -> Self {
        self.services.push(uuid);
        self
    }

    /// Queue the result of the next read of `characteristic`
    pub fn read(self, characteristic: Uuid, value: &[u8]) -> Self {
        self.queue_read(characteristic, Ok(value.to_vec()));
        self
    }

    pub fn failing_read(self, characteristic: Uuid) -> Self {
        self.queue_read(characteristic, Err(failure()));
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.set(true);
        self
    }

    fn queue_read(&self, characteristic: Uuid, result: Result<Vec<u8>, TransportError>) {
        self.reads
            .borrow_mut()
            .entry(characteristic)
            .or_default()
            .push_back(result);
    }
}

impl Transport for FakeTransport {
    type Link = FakeLink;
    type Service = Uuid;

    async fn discover(&self, _window: Duration) -> Result<Vec<Advertisement>, TransportError> {
        self.scans_run.set(self.scans_run.get() + 1);
        self.scans
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn connect(&self, address: &str) -> Result<FakeLink, TransportError> {
        self.connects.set(self.connects.get() + 1);
        let failures = self.connect_failures.get();
        if failures > 0 {
            self.connect_failures.set(failures - 1);
            return Err(failure());
        }
        Ok(FakeLink {
            address: address.to_string(),
        })
    }

    async fn disconnect(&self, link: &FakeLink) -> Result<(), TransportError> {
        self.disconnected.borrow_mut().push(link.address.clone());
        Ok(())
    }

    async fn service(&self, _link: &FakeLink, uuid: Uuid) -> Option<Uuid> {
        self.services.contains(&uuid).then_some(uuid)
    }

    async fn read(
        &self,
        _link: &FakeLink,
        _service: &Uuid,
        characteristic: Uuid,
    ) -> Result<Vec<u8>, TransportError> {
        self.reads_run.set(self.reads_run.get() + 1);
        self.reads
            .borrow_mut()
            .get_mut(&characteristic)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Err(TransportError::CharacteristicNotFound(characteristic)))
    }

    async fn write(
        &self,
        _link: &FakeLink,
        service: &Uuid,
        characteristic: Uuid,
        data: &[u8],
    ) -> Result<(), TransportError> {
        self.writes_run.set(self.writes_run.get() + 1);
        if self.fail_writes.get() {
            return Err(failure());
        }
        self.writes.borrow_mut().push(Write {
            service: *service,
            characteristic,
            data: data.to_vec(),
        });
        Ok(())
    }
}
