use crate::errors::SiftResult;
use crate::models::Ticket;

/// Source of cleaned ticket text and timestamps.
pub trait ITicketSource: Send + Sync {
    fn get_ticket(&self, ticket_id: &str) -> SiftResult<Option<Ticket>>;

    /// Fetch several tickets; unknown ids are skipped.
    fn get_tickets(&self, ticket_ids: &[String]) -> SiftResult<Vec<Ticket>> {
        let mut tickets = Vec::with_capacity(ticket_ids.len());
        for id in ticket_ids {
            if let Some(ticket) = self.get_ticket(id)? {
                tickets.push(ticket);
            }
        }
        Ok(tickets)
    }
}
