use crate::api::client::{ApiClient, ApiError};
use crate::models::ticket::{
    Ticket, TicketCreate, TicketListItem, TicketPriority, TicketStatus, TicketUpdate,
};

// Mutations refresh the first page of the list with the default page size
// and no filter; the store keeps no pagination state of its own.
const REFRESH_SKIP: u32 = 0;
const REFRESH_LIMIT: u32 = 10;

/// Ticket list and detail state for the views.
///
/// The error contract is asymmetric: fetches record failures in `error` and
/// return nothing, so a view can render the message passively; mutations
/// record the failure *and* return it, so the calling flow can also react
/// (abort, keep a form open, exit nonzero).
#[derive(Default)]
pub struct TicketStore {
    tickets: Vec<TicketListItem>,
    current_ticket: Option<Ticket>,
    is_loading: bool,
    error: Option<String>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickets(&self) -> &[TicketListItem] {
        &self.tickets
    }

    pub fn current_ticket(&self) -> Option<&Ticket> {
        self.current_ticket.as_ref()
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Safe to call any number of times, with or without a pending error.
    #[allow(dead_code)]
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replaces the held list with one page of results. The previous list is
    /// kept when the fetch fails.
    pub async fn fetch_tickets(
        &mut self,
        client: &ApiClient,
        skip: u32,
        limit: u32,
        status: Option<TicketStatus>,
    ) {
        self.is_loading = true;
        self.error = None;
        match client.get_tickets(skip, limit, status).await {
            Ok(tickets) => self.tickets = tickets,
            Err(err) => self.error = Some(err.to_string()),
        }
        self.is_loading = false;
    }

    /// Replaces the held detail with a fresh copy, comments included.
    pub async fn fetch_ticket(&mut self, client: &ApiClient, ticket_id: u64) {
        self.is_loading = true;
        self.error = None;
        match client.get_ticket(ticket_id).await {
            Ok(ticket) => self.current_ticket = Some(ticket),
            Err(err) => self.error = Some(err.to_string()),
        }
        self.is_loading = false;
    }

    /// Creates a ticket, then refreshes the first page of the list so the
    /// new ticket shows up. Returns the created ticket as the backend
    /// stored it.
    pub async fn create_ticket(
        &mut self,
        client: &ApiClient,
        title: &str,
        description: &str,
        priority: TicketPriority,
    ) -> Result<Ticket, ApiError> {
        self.is_loading = true;
        self.error = None;
        let result = self.submit_create(client, title, description, priority).await;
        self.is_loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn submit_create(
        &mut self,
        client: &ApiClient,
        title: &str,
        description: &str,
        priority: TicketPriority,
    ) -> Result<Ticket, ApiError> {
        let created = client
            .create_ticket(&TicketCreate {
                title: title.to_string(),
                description: description.to_string(),
                priority,
            })
            .await?;
        self.tickets = client.get_tickets(REFRESH_SKIP, REFRESH_LIMIT, None).await?;
        Ok(created)
    }

    /// Applies a partial update, replaces the held detail with the backend's
    /// copy, then refreshes the list.
    pub async fn update_ticket(
        &mut self,
        client: &ApiClient,
        ticket_id: u64,
        patch: &TicketUpdate,
    ) -> Result<Ticket, ApiError> {
        self.is_loading = true;
        self.error = None;
        let result = self.submit_update(client, ticket_id, patch).await;
        self.is_loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn submit_update(
        &mut self,
        client: &ApiClient,
        ticket_id: u64,
        patch: &TicketUpdate,
    ) -> Result<Ticket, ApiError> {
        let updated = client.update_ticket(ticket_id, patch).await?;
        self.current_ticket = Some(updated.clone());
        self.tickets = client.get_tickets(REFRESH_SKIP, REFRESH_LIMIT, None).await?;
        Ok(updated)
    }

    /// Deletes a ticket, refreshes the list, and drops the held detail. The
    /// detail is only dropped once the whole sequence succeeded.
    pub async fn delete_ticket(
        &mut self,
        client: &ApiClient,
        ticket_id: u64,
    ) -> Result<(), ApiError> {
        self.is_loading = true;
        self.error = None;
        let result = self.submit_delete(client, ticket_id).await;
        self.is_loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn submit_delete(&mut self, client: &ApiClient, ticket_id: u64) -> Result<(), ApiError> {
        client.delete_ticket(ticket_id).await?;
        self.tickets = client.get_tickets(REFRESH_SKIP, REFRESH_LIMIT, None).await?;
        self.current_ticket = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::credentials::MemoryCredentialStore;
    use crate::store::session::SessionHandle;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::new(
            base_url,
            SessionHandle::new(),
            Arc::new(MemoryCredentialStore::new()),
        )
    }

    fn user_value(id: u64, username: &str) -> serde_json::Value {
        json!({
            "id": id,
            "email": format!("{}@example.com", username),
            "username": username,
            "full_name": null,
            "is_active": true,
            "is_admin": false,
            "created_at": "2025-08-01T09:30:00",
            "updated_at": "2025-08-01T09:30:00"
        })
    }

    fn list_item_value(id: u64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "status": "open",
            "priority": "medium",
            "creator_id": 1,
            "assigned_to_id": null,
            "created_at": "2025-08-12T14:05:00",
            "updated_at": "2025-08-12T14:05:00",
            "creator": user_value(1, "agent"),
            "assigned_to": null
        })
    }

    fn ticket_value(id: u64, title: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": "Paper tray 2 keeps jamming on duplex jobs.",
            "status": status,
            "priority": "high",
            "creator_id": 1,
            "assigned_to_id": null,
            "created_at": "2025-08-12T14:05:00",
            "updated_at": "2025-08-12T14:05:00",
            "resolved_at": null,
            "creator": user_value(1, "agent"),
            "assigned_to": null,
            "comments": []
        })
    }

    /// Matches the refresh the store issues after a mutation.
    fn first_page_query() -> Matcher {
        Matcher::Exact("skip=0&limit=10".to_string())
    }

    #[tokio::test]
    async fn test_fetch_tickets_replaces_list() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([list_item_value(1, "First"), list_item_value(2, "Second")]).to_string())
            .create_async()
            .await;

        store.fetch_tickets(&client, 0, 10, None).await;

        assert_eq!(store.tickets().len(), 2);
        assert_eq!(store.tickets()[0].title, "First");
        assert!(store.error().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_failure_records_error_and_keeps_list() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        let ok = server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::Exact("skip=0&limit=10".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([list_item_value(1, "First")]).to_string())
            .expect(1)
            .create_async()
            .await;
        store.fetch_tickets(&client, 0, 10, None).await;
        ok.assert_async().await;

        server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::Exact("skip=10&limit=10".to_string()))
            .with_status(500)
            .with_body(json!({"detail": "database is down"}).to_string())
            .create_async()
            .await;
        store.fetch_tickets(&client, 10, 10, None).await;

        // The failure is recorded for display, not returned; the stale list
        // stays visible.
        assert_eq!(store.tickets().len(), 1);
        let recorded = store.error().unwrap_or_default().to_string();
        assert!(recorded.contains("database is down"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_ticket_replaces_detail() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("GET", "/api/tickets/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ticket_value(42, "Printer jammed", "open").to_string())
            .create_async()
            .await;

        store.fetch_ticket(&client, 42).await;

        assert_eq!(store.current_ticket().map(|t| t.id), Some(42));
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_fetch_ticket_missing_records_error() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("GET", "/api/tickets/9000")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(json!({"detail": "Ticket not found"}).to_string())
            .create_async()
            .await;

        store.fetch_ticket(&client, 9000).await;

        assert!(store.current_ticket().is_none());
        let recorded = store.error().unwrap_or_default().to_string();
        assert!(recorded.contains("Ticket not found"));
    }

    #[tokio::test]
    async fn test_create_refreshes_first_page_exactly_once() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        let create = server
            .mock("POST", "/api/tickets/")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(ticket_value(42, "Printer jammed", "open").to_string())
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("GET", "/api/tickets/")
            .match_query(first_page_query())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([list_item_value(42, "Printer jammed")]).to_string())
            .expect(1)
            .create_async()
            .await;

        let created = store
            .create_ticket(&client, "Printer jammed", "Tray 2 jams on duplex.", TicketPriority::High)
            .await
            .unwrap();

        create.assert_async().await;
        refresh.assert_async().await;
        assert_eq!(created.id, 42);
        assert_eq!(store.tickets().len(), 1);
        assert!(store.error().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_create_failure_records_error_and_skips_refresh() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("POST", "/api/tickets/")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(json!({"detail": "title too short"}).to_string())
            .create_async()
            .await;
        let refresh = server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let result = store
            .create_ticket(&client, "x", "too short anyway", TicketPriority::Low)
            .await;

        refresh.assert_async().await;
        // Mutations both record the failure and hand it back.
        assert!(result.is_err());
        let recorded = store.error().unwrap_or_default().to_string();
        assert!(recorded.contains("title too short"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_update_replaces_detail_then_refreshes() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("PUT", "/api/tickets/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ticket_value(42, "Printer jammed", "closed").to_string())
            .create_async()
            .await;
        let refresh = server
            .mock("GET", "/api/tickets/")
            .match_query(first_page_query())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([]).to_string())
            .expect(1)
            .create_async()
            .await;

        let patch = TicketUpdate {
            status: Some(TicketStatus::Closed),
            ..Default::default()
        };
        let updated = store.update_ticket(&client, 42, &patch).await.unwrap();

        refresh.assert_async().await;
        assert_eq!(updated.status, TicketStatus::Closed);
        assert_eq!(
            store.current_ticket().map(|t| t.status),
            Some(TicketStatus::Closed)
        );
    }

    #[tokio::test]
    async fn test_delete_clears_detail_and_refreshes() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("GET", "/api/tickets/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ticket_value(42, "Printer jammed", "open").to_string())
            .create_async()
            .await;
        store.fetch_ticket(&client, 42).await;
        assert!(store.current_ticket().is_some());

        server
            .mock("DELETE", "/api/tickets/42")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("GET", "/api/tickets/")
            .match_query(first_page_query())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([list_item_value(7, "Unrelated")]).to_string())
            .create_async()
            .await;

        store.delete_ticket(&client, 42).await.unwrap();

        assert!(store.current_ticket().is_none());
        assert!(store.tickets().iter().all(|t| t.id != 42));
        assert_eq!(store.tickets().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_during_refresh_keeps_detail() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("GET", "/api/tickets/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ticket_value(42, "Printer jammed", "open").to_string())
            .create_async()
            .await;
        store.fetch_ticket(&client, 42).await;

        server
            .mock("DELETE", "/api/tickets/42")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("GET", "/api/tickets/")
            .match_query(first_page_query())
            .with_status(500)
            .with_body(json!({"detail": "database is down"}).to_string())
            .create_async()
            .await;

        let result = store.delete_ticket(&client, 42).await;

        // The delete went through but the sequence did not finish, so the
        // detail is not dropped and the caller sees the failure.
        assert!(result.is_err());
        assert!(store.current_ticket().is_some());
        assert!(store.error().is_some());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_clear_error_is_idempotent() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        server
            .mock("GET", "/api/tickets/9000")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(json!({"detail": "Ticket not found"}).to_string())
            .create_async()
            .await;
        store.fetch_ticket(&client, 9000).await;
        assert!(store.error().is_some());

        store.clear_error();
        assert!(store.error().is_none());

        // Clearing again with nothing pending changes nothing.
        store.clear_error();
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_new_fetch_resets_previous_error() {
        let mut server = Server::new_async().await;
        let client = test_client(&server.url());
        let mut store = TicketStore::new();

        let broken = server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::Exact("skip=0&limit=10".to_string()))
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;
        store.fetch_tickets(&client, 0, 10, None).await;
        assert!(store.error().is_some());
        broken.assert_async().await;

        server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::Exact("skip=0&limit=25".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([]).to_string())
            .create_async()
            .await;
        store.fetch_tickets(&client, 0, 25, None).await;

        assert!(store.error().is_none());
    }
}
