//! Namespace and scheme URIs defined by ISO/IEC 23009-1 and 23009-5.

/// DASH MPD namespace.
pub const MPD_NS: &str = "urn:mpeg:dash:schema:mpd:2011";

/// SAND extension namespace used inside MPDs (e.g. `sand:Channel`).
pub const SAND_NS: &str = "urn:mpeg:dash:schema:sand:2016";

/// SAND message envelope namespace.
pub const SAND_MESSAGE_NS: &str = "urn:mpeg:dash:schema:sandmessage:2016";

/// Implicitly bound `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Channel over WebSocket.
pub const CHANNEL_WEBSOCKET_SCHEME: &str = "urn:mpeg:dash:sand:channel:websocket:2016";

/// Channel over plain HTTP requests.
pub const CHANNEL_HTTP_SCHEME: &str = "urn:mpeg:dash:sand:channel:http:2016";

/// Channel carried in HTTP headers of regular segment requests.
pub const CHANNEL_HEADER_SCHEME: &str = "urn:mpeg:dash:sand:channel:header:2016";

/// `Reporting@schemeIdUri` value that routes reports to a declared SAND Channel.
pub const REPORTING_SAND_CHANNEL_SCHEME: &str = "urn:mpeg:dash:sand:channel:2016";
