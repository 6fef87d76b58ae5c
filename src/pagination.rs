//! Relay-style cursor pagination
//!
//! Cursors name a position in the full ordered sequence, not in the page, so
//! they stay valid while a client pages forward and backward.

use std::borrow::Cow;
use std::future::Future;

use async_graphql::{Object, OutputType, SimpleObject, TypeName};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, warn};

use crate::config::PagerConfig;
use crate::source::BoxError;
use crate::{GraphQLError, Result};

const OFFSET_PREFIX: &str = "arrayconnection:";

/// Page information
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Edge in a connection
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

impl<T: OutputType> TypeName for Edge<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Edge", T::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Edge<T> {
    async fn cursor(&self) -> &str {
        &self.cursor
    }

    async fn node(&self) -> &T {
        &self.node
    }
}

/// Connection (paginated result)
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T: OutputType> TypeName for Connection<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Connection", T::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Connection<T> {
    async fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    async fn page_info(&self) -> &PageInfo {
        &self.page_info
    }
}

impl<T> Connection<T> {
    /// Create empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo {
                has_next_page: false,
                has_previous_page: false,
                start_cursor: None,
                end_cursor: None,
            },
        }
    }

    /// Nodes of the page, in order
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// A sequence with a deterministic order
///
/// The pager only accepts this type, so paging an unordered collection has to
/// be an explicit decision at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordered<T> {
    items: Vec<T>,
}

impl<T> Ordered<T> {
    /// Stable-sort items by a key
    pub fn by_key<K, F>(mut items: Vec<T>, key: F) -> Self
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        items.sort_by_key(key);
        Self { items }
    }

    /// Trust the order the items already have, e.g. from an `ORDER BY` query
    pub fn presorted(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T: Ord> Ordered<T> {
    pub fn sorted(mut items: Vec<T>) -> Self {
        items.sort();
        Self { items }
    }
}

impl<T> Default for Ordered<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Cursor encoding/decoding
pub struct CursorCodec;

impl CursorCodec {
    /// Encode cursor to base64
    pub fn encode(value: &str) -> String {
        BASE64.encode(value.as_bytes())
    }

    /// Decode cursor from base64
    pub fn decode(cursor: &str) -> Result<String> {
        let bytes = BASE64
            .decode(cursor.as_bytes())
            .map_err(|e| GraphQLError::InvalidCursor(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| GraphQLError::InvalidCursor(e.to_string()))
    }

    /// Cursor for a position in the full sequence
    pub fn encode_offset(offset: usize) -> String {
        Self::encode(&format!("{}{}", OFFSET_PREFIX, offset))
    }

    /// Position named by a cursor
    pub fn decode_offset(cursor: &str) -> Result<usize> {
        let decoded = Self::decode(cursor)?;
        let digits = decoded.strip_prefix(OFFSET_PREFIX).ok_or_else(|| {
            GraphQLError::InvalidCursor(format!("'{}' is not an offset cursor", cursor))
        })?;
        // one cursor per offset: no sign, no leading zeros
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GraphQLError::InvalidCursor(format!("'{}' has no offset", cursor)));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(GraphQLError::InvalidCursor(format!("'{}' has a padded offset", cursor)));
        }
        digits
            .parse()
            .map_err(|e: std::num::ParseIntError| GraphQLError::InvalidCursor(e.to_string()))
    }
}

/// Connection arguments
///
/// Follows the Relay Cursor Connections Specification:
/// https://relay.dev/graphql/connections.htm
///
/// `after` and `before` narrow the range first. Then `first` keeps the
/// leading items and `last` keeps the trailing items of what `first` left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    /// Number of items to return (forward pagination)
    pub first: Option<i32>,

    /// Cursor to start after (forward pagination)
    pub after: Option<String>,

    /// Number of items to return (backward pagination)
    pub last: Option<i32>,

    /// Cursor to end before (backward pagination)
    pub before: Option<String>,
}

/// Arguments after validation and cursor decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    after: Option<usize>,
    before: Option<usize>,
    first: Option<usize>,
    last: Option<usize>,
}

impl ConnectionArgs {
    pub fn forward(first: i32) -> Self {
        Self {
            first: Some(first),
            ..Default::default()
        }
    }

    pub fn backward(last: i32) -> Self {
        Self {
            last: Some(last),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Validate counts and cursors without touching any data
    pub fn validate(&self, config: &PagerConfig) -> Result<()> {
        self.window(config).map(|_| ())
    }

    fn window(&self, config: &PagerConfig) -> Result<Window> {
        let first = count("first", self.first, config)?;
        let last = count("last", self.last, config)?;
        let after = self.after.as_deref().map(CursorCodec::decode_offset).transpose()?;
        let before = self.before.as_deref().map(CursorCodec::decode_offset).transpose()?;

        let first = match (first, last) {
            (None, None) => config.default_page_size,
            _ => first,
        };

        Ok(Window {
            after,
            before,
            first,
            last,
        })
    }
}

fn count(name: &str, value: Option<i32>, config: &PagerConfig) -> Result<Option<usize>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = usize::try_from(value)
        .map_err(|_| GraphQLError::InvalidArgument(format!("'{}' must be non-negative", name)))?;
    if let Some(max) = config.max_page_size {
        if value > max {
            return Err(GraphQLError::InvalidArgument(format!(
                "'{}' cannot exceed {}",
                name, max
            )));
        }
    }
    Ok(Some(value))
}

/// Slices ordered sequences into connections
#[derive(Debug, Clone, Default)]
pub struct Pager {
    config: PagerConfig,
}

impl Pager {
    pub fn new(config: PagerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Paginate a sequence already in hand
    pub fn paginate<T>(&self, items: Ordered<T>, args: &ConnectionArgs) -> Result<Connection<T>> {
        let window = args.window(&self.config).inspect_err(|e| {
            warn!(error = %e, "Rejected connection arguments");
        })?;
        Ok(slice(items, window))
    }

    /// Paginate a sequence that is still being fetched
    ///
    /// Arguments and cursors are checked before the fetch is awaited. A failed
    /// fetch fails the whole connection.
    pub async fn paginate_pending<T, F, E>(
        &self,
        pending: F,
        args: &ConnectionArgs,
    ) -> Result<Connection<T>>
    where
        F: Future<Output = std::result::Result<Ordered<T>, E>>,
        E: Into<BoxError>,
    {
        let window = args.window(&self.config).inspect_err(|e| {
            warn!(error = %e, "Rejected connection arguments");
        })?;
        let items = pending.await.map_err(|e| {
            let e = e.into();
            warn!(error = %e, "Connection fetch failed");
            GraphQLError::Upstream(e)
        })?;
        Ok(slice(items, window))
    }
}

fn slice<T>(items: Ordered<T>, window: Window) -> Connection<T> {
    let len = items.len();

    let mut lo = 0;
    let mut hi = len;
    if let Some(after) = window.after {
        lo = after.saturating_add(1).min(len);
    }
    if let Some(before) = window.before {
        hi = hi.min(before);
    }
    let hi = hi.max(lo);

    let mut start = lo;
    let mut end = hi;
    if let Some(first) = window.first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = window.last {
        start = start.max(end.saturating_sub(last));
    }

    debug!(len, lo, hi, start, end, "Slicing connection");

    let edges: Vec<Edge<T>> = items
        .into_inner()
        .into_iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(idx, node)| Edge {
            cursor: CursorCodec::encode_offset(idx),
            node,
        })
        .collect();

    let start_cursor = edges.first().map(|e| e.cursor.clone());
    let end_cursor = edges.last().map(|e| e.cursor.clone());

    Connection {
        edges,
        page_info: PageInfo {
            has_next_page: end < hi,
            has_previous_page: start > lo,
            start_cursor,
            end_cursor,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> Ordered<u32> {
        Ordered::sorted((0..10).collect())
    }

    fn nodes(conn: &Connection<u32>) -> Vec<u32> {
        conn.nodes().copied().collect()
    }

    fn cursor(offset: usize) -> String {
        CursorCodec::encode_offset(offset)
    }

    #[test]
    fn test_cursor_codec() {
        let original = "test-cursor";
        let encoded = CursorCodec::encode(original);
        let decoded = CursorCodec::decode(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_offset_cursor_format() {
        // base64("arrayconnection:2")
        assert_eq!(cursor(2), "YXJyYXljb25uZWN0aW9uOjI=");
        assert_eq!(CursorCodec::decode_offset(&cursor(2)).unwrap(), 2);
    }

    #[test]
    fn test_offset_cursor_rejects_non_canonical() {
        let non_canonical = [
            "arrayconnection:",
            "arrayconnection:+3",
            "arrayconnection:03",
            "arrayconnection:-1",
            "other:3",
        ];
        for raw in non_canonical {
            let encoded = CursorCodec::encode(raw);
            assert!(
                matches!(CursorCodec::decode_offset(&encoded), Err(GraphQLError::InvalidCursor(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_sequence() {
        let conn = Pager::default()
            .paginate(Ordered::<u32>::default(), &ConnectionArgs::forward(5))
            .unwrap();
        assert_eq!(conn, Connection::empty());
    }

    #[test]
    fn test_first() {
        let conn = Pager::default().paginate(ten(), &ConnectionArgs::forward(3)).unwrap();
        assert_eq!(nodes(&conn), vec![0, 1, 2]);
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);
        assert_eq!(conn.page_info.start_cursor, Some(cursor(0)));
        assert_eq!(conn.page_info.end_cursor, Some(cursor(2)));
    }

    #[test]
    fn test_after_first() {
        let args = ConnectionArgs::forward(3).after(cursor(2));
        let conn = Pager::default().paginate(ten(), &args).unwrap();
        assert_eq!(nodes(&conn), vec![3, 4, 5]);
        assert_eq!(conn.edges[0].cursor, cursor(3));
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);
    }

    #[test]
    fn test_last_before() {
        let args = ConnectionArgs::backward(2).before(cursor(5));
        let conn = Pager::default().paginate(ten(), &args).unwrap();
        assert_eq!(nodes(&conn), vec![3, 4]);
        assert!(conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn test_after_and_before() {
        let args = ConnectionArgs::default().after(cursor(1)).before(cursor(4));
        let conn = Pager::default().paginate(ten(), &args).unwrap();
        assert_eq!(nodes(&conn), vec![2, 3]);
        assert!(!conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn test_crossed_cursors_yield_empty_page() {
        let args = ConnectionArgs::default().after(cursor(6)).before(cursor(3));
        let conn = Pager::default().paginate(ten(), &args).unwrap();
        assert!(conn.edges.is_empty());
        assert_eq!(conn.page_info.start_cursor, None);
    }

    #[test]
    fn test_first_then_last() {
        let args = ConnectionArgs {
            first: Some(5),
            last: Some(2),
            ..Default::default()
        };
        let conn = Pager::default().paginate(ten(), &args).unwrap();
        assert_eq!(nodes(&conn), vec![3, 4]);
        assert!(conn.page_info.has_previous_page);
        assert!(conn.page_info.has_next_page);
    }

    #[test]
    fn test_first_zero() {
        let conn = Pager::default().paginate(ten(), &ConnectionArgs::forward(0)).unwrap();
        assert!(conn.edges.is_empty());
        assert!(conn.page_info.has_next_page);
        assert_eq!(conn.page_info.end_cursor, None);
    }

    #[test]
    fn test_after_past_end() {
        let args = ConnectionArgs::forward(3).after(cursor(40));
        let conn = Pager::default().paginate(ten(), &args).unwrap();
        assert!(conn.edges.is_empty());
        assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn test_no_counts_returns_everything() {
        let conn = Pager::default().paginate(ten(), &ConnectionArgs::default()).unwrap();
        assert_eq!(conn.edges.len(), 10);
        assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn test_default_page_size() {
        let pager = Pager::new(PagerConfig {
            default_page_size: Some(4),
            max_page_size: None,
        });
        let conn = pager.paginate(ten(), &ConnectionArgs::default()).unwrap();
        assert_eq!(nodes(&conn), vec![0, 1, 2, 3]);

        let conn = pager.paginate(ten(), &ConnectionArgs::backward(2)).unwrap();
        assert_eq!(nodes(&conn), vec![8, 9]);
    }

    #[test]
    fn test_negative_counts() {
        let pager = Pager::default();
        assert!(matches!(
            pager.paginate(ten(), &ConnectionArgs::forward(-1)),
            Err(GraphQLError::InvalidArgument(_))
        ));
        assert!(matches!(
            pager.paginate(ten(), &ConnectionArgs::backward(-3)),
            Err(GraphQLError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_max_page_size() {
        let args = ConnectionArgs::forward(101);
        assert!(matches!(
            args.validate(&PagerConfig::default()),
            Err(GraphQLError::InvalidArgument(_))
        ));
        assert!(ConnectionArgs::forward(100).validate(&PagerConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_cursor() {
        let args = ConnectionArgs::default().after("not-a-real-cursor");
        assert!(matches!(
            Pager::default().paginate(ten(), &args),
            Err(GraphQLError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_ordered_by_key_is_stable() {
        let ordered = Ordered::by_key(vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')], |pair| pair.0);
        assert_eq!(ordered.into_inner(), vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[tokio::test]
    async fn test_paginate_pending() {
        let pending = async { Ok::<_, BoxError>(ten()) };
        let conn = Pager::default()
            .paginate_pending(pending, &ConnectionArgs::forward(2).after(cursor(7)))
            .await
            .unwrap();
        assert_eq!(nodes(&conn), vec![8, 9]);
        assert!(!conn.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_paginate_pending_propagates_failure() {
        let pending = async { Err::<Ordered<u32>, BoxError>("database unavailable".into()) };
        let err = Pager::default()
            .paginate_pending(pending, &ConnectionArgs::forward(2))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphQLError::Upstream(_)));
        assert!(err.to_string().contains("database unavailable"));
    }

    #[tokio::test]
    async fn test_paginate_pending_checks_arguments_before_fetching() {
        let fetched = std::sync::atomic::AtomicBool::new(false);
        let pending = async {
            fetched.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, BoxError>(ten())
        };
        let err = Pager::default()
            .paginate_pending(pending, &ConnectionArgs::forward(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphQLError::InvalidArgument(_)));
        assert!(!fetched.load(std::sync::atomic::Ordering::SeqCst));
    }
}
