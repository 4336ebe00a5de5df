//! RTSP URI collaborator. The core never speaks RTSP itself; it only
//! asks this collaborator for the URI string to put in a
//! `VIDEO_STREAM_INFORMATION` reply.

/// Supplies the RTSP URI the GCS should connect to for a given stream.
pub trait RtspUriProvider {
    fn get_rtsp_uri(&self, server_addr: Option<&str>, stream_id: u8, query_suffix: &str) -> String;
}

/// Default provider: builds a conventional `rtsp://host/streamN[?suffix]`
/// URI. Good enough for a real RTSP server that names its mount points
/// after the stream ID; a real deployment can swap in its own provider.
pub struct DefaultRtspUriProvider;

impl RtspUriProvider for DefaultRtspUriProvider {
    fn get_rtsp_uri(&self, server_addr: Option<&str>, stream_id: u8, query_suffix: &str) -> String {
        let host = server_addr.unwrap_or("0.0.0.0");
        format!("rtsp://{host}/stream{stream_id}{query_suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_uri_with_suffix() {
        let provider = DefaultRtspUriProvider;
        let uri = provider.get_rtsp_uri(Some("192.168.1.10"), 1, "?width=640&height=480");
        assert_eq!(uri, "rtsp://192.168.1.10/stream1?width=640&height=480");
    }

    #[test]
    fn builds_uri_without_suffix() {
        let provider = DefaultRtspUriProvider;
        let uri = provider.get_rtsp_uri(None, 1, "");
        assert_eq!(uri, "rtsp://0.0.0.0/stream1");
    }
}
