use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use hexe_chat::Event;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::config::HexeApiConfig;
use crate::error::{parse_error_message, HexeApiError};
use crate::events::{StreamEnd, StreamItem};
use crate::headers::{build_headers, ACCEPT_EVENT_STREAM, ACCEPT_JSON};
use crate::payload::{EventsEnvelope, HistoryQuery};
use crate::retry::is_retryable_http_error;
use crate::retry::{retry_delay_ms, MAX_RETRIES};
use crate::sse::SseStreamParser;
use crate::url::{events_history_url, events_stream_url, normalize_base_url, submit_url};

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct HexeApiClient {
    http: Client,
    config: HexeApiConfig,
}

impl HexeApiClient {
    pub fn new(config: HexeApiConfig) -> Result<Self, HexeApiError> {
        if reqwest::Url::parse(&normalize_base_url(&config.base_url)).is_err() {
            return Err(HexeApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        // Timeouts are applied per request: a client-wide one would cut the
        // long-lived event stream.
        let http = Client::builder().build().map_err(HexeApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HexeApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> String {
        normalize_base_url(&self.config.base_url)
    }

    pub fn build_headers(&self, accept: &str) -> Result<HeaderMap, HexeApiError> {
        let headers = build_headers(&self.config, accept);
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            let name =
                HeaderName::from_bytes(key.as_bytes()).map_err(|error| HexeApiError::InvalidHeader {
                    name: key.clone(),
                    reason: error.to_string(),
                })?;
            let value = HeaderValue::from_str(&value).map_err(|error| HexeApiError::InvalidHeader {
                name: key.clone(),
                reason: error.to_string(),
            })?;
            out.insert(name, value);
        }
        Ok(out)
    }

    pub fn build_stream_request(&self) -> Result<RequestBuilder, HexeApiError> {
        let headers = self.build_headers(ACCEPT_EVENT_STREAM)?;
        Ok(self
            .http
            .get(events_stream_url(&self.config.base_url, self.config.history_limit))
            .headers(headers))
    }

    pub fn build_history_request(&self, query: &HistoryQuery) -> Result<RequestBuilder, HexeApiError> {
        let headers = self.build_headers(ACCEPT_JSON)?;
        let request = self
            .http
            .get(events_history_url(&self.config.base_url, query))
            .headers(headers);
        Ok(self.with_timeout(request))
    }

    pub fn build_submit_request(&self, content: &str) -> Result<RequestBuilder, HexeApiError> {
        if content.trim().is_empty() {
            return Err(HexeApiError::EmptyMessage);
        }
        let mut headers = self.build_headers(ACCEPT_JSON)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        let request = self
            .http
            .post(submit_url(&self.config.base_url))
            .headers(headers)
            .body(content.to_owned());
        Ok(self.with_timeout(request))
    }

    fn with_timeout(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Send a request, retrying transient failures with exponential backoff.
    ///
    /// `build` is called once per attempt since request builders are consumed
    /// on send.
    pub async fn send_with_retry<B>(
        &self,
        build: B,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, HexeApiError>
    where
        B: Fn() -> Result<RequestBuilder, HexeApiError>,
    {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if is_cancelled(cancellation) {
                return Err(HexeApiError::Cancelled);
            }

            let response = build()?.send();
            let response = await_or_cancel(response, cancellation)
                .await?
                .map_err(HexeApiError::from);

            match response {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    last_status = Some(response.status());
                    let status = response.status();
                    let body = await_or_cancel(response.text(), cancellation)
                        .await?
                        .unwrap_or_default();
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &body) {
                        let delay = retry_delay_ms(attempt);
                        tracing::warn!(
                            status = status.as_u16(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying chat server request"
                        );
                        await_or_cancel(tokio::time::sleep(delay), cancellation).await?;
                        continue;
                    }

                    return Err(HexeApiError::Status(status, message));
                }
                Err(error) => {
                    let message = error.to_string();
                    last_error = Some(message.clone());
                    if attempt < MAX_RETRIES {
                        let delay = retry_delay_ms(attempt);
                        tracing::warn!(
                            error = %message,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "chat server unreachable, retrying"
                        );
                        await_or_cancel(tokio::time::sleep(delay), cancellation).await?;
                        continue;
                    }
                    return Err(HexeApiError::RetryExhausted {
                        status: last_status,
                        last_error,
                    });
                }
            }
        }

        Err(HexeApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Follow the live event stream until the server closes it.
    ///
    /// Events reach `on_event` strictly in arrival order. The first payload
    /// that fails to decode ends the stream with [`HexeApiError::MalformedEvent`].
    pub async fn stream_events_with_handler<F>(
        &self,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<StreamEnd, HexeApiError>
    where
        F: FnMut(Event),
    {
        tracing::debug!(base_url = %self.base_url(), "connecting to event stream");
        let response = self
            .send_with_retry(|| self.build_stream_request(), cancellation)
            .await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut end = StreamEnd::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(HexeApiError::Cancelled);
            }
            let chunk = chunk.map_err(HexeApiError::from)?;
            for item in parser.feed(&chunk) {
                process_stream_item(item?, &mut end, &mut on_event);
            }
        }

        if is_cancelled(cancellation) {
            return Err(HexeApiError::Cancelled);
        }

        tracing::debug!(
            events = end.events,
            heartbeats = end.heartbeats,
            "event stream closed by server"
        );
        Ok(end)
    }

    /// Collect every event of a stream that the server eventually closes.
    pub async fn stream_events(
        &self,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<Event>, HexeApiError> {
        let mut events = Vec::new();
        self.stream_events_with_handler(cancellation, |event| events.push(event))
            .await?;
        Ok(events)
    }

    pub async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<Event>, HexeApiError> {
        let response = self
            .send_with_retry(|| self.build_history_request(query), None)
            .await?;
        let envelope = response.json::<EventsEnvelope>().await?;
        envelope.into_events()
    }

    /// Submit user-authored text. The resulting messages arrive later on the
    /// event stream; the response body is not inspected.
    ///
    /// The POST is not idempotent, so it is sent once. The only resend is for
    /// 503, which the server answers before reading the body.
    pub async fn submit_message(&self, content: &str) -> Result<(), HexeApiError> {
        let mut attempt = 0;
        loop {
            let response = self.build_submit_request(content)?.send().await?;
            let status = response.status();
            if status.is_success() {
                tracing::debug!(bytes = content.len(), "message submitted");
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::SERVICE_UNAVAILABLE && attempt < MAX_RETRIES {
                let delay = retry_delay_ms(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "chat server not ready, resending message"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(HexeApiError::Status(status, parse_error_message(status, &body)));
        }
    }
}

fn process_stream_item<F>(item: StreamItem, end: &mut StreamEnd, on_event: &mut F)
where
    F: FnMut(Event),
{
    end.record(&item);
    match item {
        StreamItem::Event(event) => on_event(event),
        StreamItem::Heartbeat => tracing::trace!("heartbeat"),
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, HexeApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(HexeApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(HexeApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
