fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use linkwire_protocol::constants::{LENGTH_PREFIX_SIZE, network_quality_from_bandwidth};
    use linkwire_protocol::frame::encode_frame;
    use linkwire_protocol::{Envelope, FileEnd, FileStart, MessageType};
    use linkwire_transfer::Reassembler;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture as raw bytes, exactly as it would appear in a frame payload.
    fn load_raw(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        data.trim_end().as_bytes().to_vec()
    }

    fn load_envelope(name: &str) -> Envelope {
        Envelope::from_payload(&load_raw(name))
            .unwrap_or_else(|e| panic!("failed to decode fixture {name}: {e}"))
    }

    fn load_value(name: &str) -> serde_json::Value {
        serde_json::from_slice(&load_raw(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Drops `"content": null`, which the server emits and the client omits.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(k, v)| !(k.as_str() == "content" && v.is_null()))
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect(),
            ),
            _ => v.clone(),
        }
    }

    /// Asserts that an envelope built by the client matches a fixture.
    fn assert_matches_fixture(built: &Envelope, name: &str) {
        let fixture = normalize_value(&load_value(name));
        let ours = normalize_value(&serde_json::to_value(built).unwrap());
        assert_eq!(fixture, ours, "mismatch for {name}:\n  fixture: {fixture}\n  ours:    {ours}");
    }

    // --- Server → client ---

    #[test]
    fn server_heartbeat_ack_with_null_content() {
        let envelope = load_envelope("server/heartbeat_ack.json");
        assert_eq!(envelope.kind(), MessageType::HeartbeatAck);
        assert_eq!(envelope, Envelope::heartbeat_ack());
    }

    #[test]
    fn server_chat() {
        let envelope = load_envelope("server/chat.json");
        assert_eq!(envelope.kind(), MessageType::Chat);
        assert_eq!(envelope.content_str(), Some("welcome"));
    }

    #[test]
    fn server_file_start() {
        let envelope = load_envelope("server/file_start.json");
        assert_eq!(envelope.kind(), MessageType::FileStart);
        let start: FileStart = envelope.parse_content().unwrap().unwrap();
        assert_eq!(start.filename, "report.pdf");
        assert_eq!(start.filesize, 16);
        assert_matches_fixture(
            &Envelope::file_start("report.pdf", 16).unwrap(),
            "server/file_start.json",
        );
    }

    #[test]
    fn server_file_end() {
        let envelope = load_envelope("server/file_end.json");
        let end: FileEnd = envelope.parse_content().unwrap().unwrap();
        assert_eq!(end.filename, "report.pdf");
        assert_matches_fixture(
            &Envelope::file_end("report.pdf").unwrap(),
            "server/file_end.json",
        );
    }

    #[test]
    fn server_file_chunk_is_standard_base64() {
        assert_matches_fixture(&Envelope::file_chunk(b"Hello, Linkwire!"), "server/file_chunk.json");
    }

    #[test]
    fn server_transfer_sequence_reassembles() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut reassembler = Reassembler::new(dir.path());

        let start: FileStart = load_envelope("server/file_start.json")
            .parse_content()
            .unwrap()
            .unwrap();
        reassembler.start(&start.filename, start.filesize);

        let chunk = load_envelope("server/file_chunk.json");
        reassembler.append_chunk(chunk.content_str().unwrap()).unwrap();

        let saved = reassembler.finish().unwrap();
        assert_eq!(saved.path, dir.path().join("report.pdf"));
        assert_eq!(fs::read(&saved.path).unwrap(), b"Hello, Linkwire!");
    }

    // --- Client → server ---

    #[test]
    fn client_heartbeat() {
        assert_matches_fixture(&Envelope::heartbeat(), "client/heartbeat.json");
        assert_eq!(Envelope::heartbeat().to_payload().unwrap(), load_raw("client/heartbeat.json"));
    }

    #[test]
    fn client_chat() {
        assert_matches_fixture(&Envelope::chat("hello"), "client/chat.json");
    }

    #[test]
    fn client_file_request() {
        assert_matches_fixture(&Envelope::file_request("all"), "client/filerequest.json");
    }

    #[test]
    fn client_network_quality_is_a_json_float() {
        let quality = network_quality_from_bandwidth(4000, 2000);
        assert_matches_fixture(
            &Envelope::network_quality(quality),
            "client/network_quality.json",
        );
        assert!(load_value("client/network_quality.json")["content"].is_f64());
    }

    // --- Framing ---

    #[test]
    fn fixture_frames_with_big_endian_length() {
        let payload = load_raw("server/file_start.json");
        let frame = encode_frame(&payload).unwrap();
        let len = u32::from_be_bytes(frame[..LENGTH_PREFIX_SIZE].try_into().unwrap());
        assert_eq!(len as usize, payload.len());
        assert_eq!(&frame[LENGTH_PREFIX_SIZE..], payload.as_slice());
    }
}
