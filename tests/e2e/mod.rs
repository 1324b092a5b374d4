// End-to-end tests for the unified TTS client
//
// Each test starts a fake vendor HTTP server on an ephemeral port and points
// the client at it through `TtsSettings::base_url`. The fake records every
// request it receives and the peak number of requests in flight, so tests can
// assert on the wire format, on ordering and on the concurrency budget.

mod test_elevenlabs;
mod test_google;
mod test_openai;
