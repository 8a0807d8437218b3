use std::collections::HashMap;
use std::sync::RwLock;

use sift_core::traits::ITicketSource;
use sift_core::{SiftResult, Ticket};

#[derive(Default)]
pub struct InMemoryTicketSource {
    tickets: RwLock<HashMap<String, Ticket>>,
}

impl InMemoryTicketSource {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        let source = Self::default();
        for ticket in tickets {
            source.insert(ticket);
        }
        source
    }

    pub fn insert(&self, ticket: Ticket) {
        self.tickets
            .write()
            .unwrap()
            .insert(ticket.ticket_id.clone(), ticket);
    }
}

impl ITicketSource for InMemoryTicketSource {
    fn get_ticket(&self, ticket_id: &str) -> SiftResult<Option<Ticket>> {
        Ok(self.tickets.read().unwrap().get(ticket_id).cloned())
    }
}
