//! Stateful output sanitization for chunked terminal streams.
//!
//! Remote output arrives in arbitrarily split chunks: an escape sequence, a
//! CR/LF pair, or a partially printed line can all straddle a chunk boundary.
//! [`StreamSanitizer`] strips escape sequences and raw control codes while
//! keeping enough state between calls that any split of a stream produces the
//! same text as sanitizing it whole.

use std::borrow::Cow;

use vte::{Params, Parser, Perform};

/// Stateful, restartable sanitizer for one output channel.
///
/// Each call to [`sanitize`](Self::sanitize) returns only the newly revealed
/// text. Escape-sequence recognition is handled by the VTE parser, which
/// buffers unterminated sequences internally until the next chunk arrives.
/// Line reassembly (carriage-return overwrites, at-most-once emission of the
/// current line) is layered on top.
pub struct StreamSanitizer {
    parser: Parser,
    line: LineAssembler,
}

impl StreamSanitizer {
    /// Create a sanitizer with empty state.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            line: LineAssembler::default(),
        }
    }

    /// Sanitize the next chunk of the stream.
    ///
    /// Returns the escape-free, control-free text revealed by this chunk.
    /// An unterminated escape sequence at the end of the chunk is retained
    /// and resumed on the next call; a trailing `\r` is deferred until the
    /// next chunk decides whether it is half of a CR/LF pair.
    ///
    /// A chunk that resolves to no visible text but contained a line break
    /// still yields a single `"\n"` so callers keep the visual cue that
    /// something happened.
    pub fn sanitize(&mut self, chunk: &str) -> String {
        let normalized = normalize_c1(chunk);
        self.parser.advance(&mut self.line, normalized.as_bytes());
        self.line.flush_unemitted();

        let out = std::mem::take(&mut self.line.out);
        if out.is_empty() && !self.line.pending_cr && chunk.contains(['\n', '\r']) {
            return "\n".to_string();
        }
        out
    }

    /// Resolve any deferred carriage return and flush the current line.
    ///
    /// Used when the stream is known to be complete (one-shot messages).
    /// Cross-chunk sanitizers never call this; their leftovers are cleared
    /// by [`reset`](Self::reset) instead.
    pub fn finish(&mut self) -> String {
        self.line.resolve_pending_cr();
        self.line.flush_unemitted();
        std::mem::take(&mut self.line.out)
    }

    /// Discard all cross-chunk state.
    ///
    /// Called on reconnect, shell start, and new command start.
    pub fn reset(&mut self) {
        self.parser = Parser::new();
        self.line = LineAssembler::default();
    }
}

impl Default for StreamSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitize a complete, self-contained piece of text.
///
/// One-shot variant with fresh state: status and error messages attached to
/// transport events are sanitized this way, independent of the per-channel
/// stream sanitizers.
pub fn sanitize_once(text: &str) -> String {
    let mut sanitizer = StreamSanitizer::new();
    let mut out = sanitizer.sanitize(text);
    out.push_str(&sanitizer.finish());
    if out.is_empty() && text.contains(['\n', '\r']) {
        return "\n".to_string();
    }
    out
}

/// Rewrite single-byte C1 introducers into their two-byte ESC forms.
///
/// The VTE parser only recognizes 7-bit sequences in UTF-8 text, so the
/// single-byte CSI (U+009B) and ST (U+009C) are mapped to `ESC [` and
/// `ESC \` before parsing. Returns the input unchanged (no allocation) when
/// neither occurs.
fn normalize_c1(chunk: &str) -> Cow<'_, str> {
    if !chunk.contains(['\u{9b}', '\u{9c}']) {
        return Cow::Borrowed(chunk);
    }
    let mut normalized = String::with_capacity(chunk.len() + 4);
    for c in chunk.chars() {
        match c {
            '\u{9b}' => normalized.push_str("\x1b["),
            '\u{9c}' => normalized.push_str("\x1b\\"),
            _ => normalized.push(c),
        }
    }
    Cow::Owned(normalized)
}

/// VTE performer that reassembles printable text into lines.
///
/// Tracks the terminal's current (possibly overwritten) line and how much of
/// it has already been handed to the caller, so every character is emitted
/// at most once even though a trailing partial line is made visible after
/// each chunk.
#[derive(Default)]
struct LineAssembler {
    /// Accumulated content of the current line.
    current_line: String,
    /// Characters of `current_line` already returned to the caller.
    emitted: usize,
    /// A `\r` was seen at the end of input; lone-CR vs CR/LF is undecided.
    pending_cr: bool,
    /// Output accumulated during the current `sanitize` call.
    out: String,
}

impl LineAssembler {
    /// Emit the not-yet-emitted suffix of the current line.
    fn flush_unemitted(&mut self) {
        let total = self.current_line.chars().count();
        if self.emitted < total {
            self.out.extend(self.current_line.chars().skip(self.emitted));
            self.emitted = total;
        }
    }

    /// Commit the current line: flush it, append a line break, start fresh.
    fn commit_line(&mut self) {
        self.flush_unemitted();
        self.out.push('\n');
        self.current_line.clear();
        self.emitted = 0;
    }

    /// Resolve a deferred `\r` that turned out not to precede `\n`.
    ///
    /// A lone carriage return is a cursor return used for overwriting: the
    /// unemitted suffix is flushed, a line break stands in for the overwrite
    /// (only if the line had content), and the line restarts empty. Column
    /// addressed repainting is deliberately not reproduced.
    fn resolve_pending_cr(&mut self) {
        if !self.pending_cr {
            return;
        }
        self.pending_cr = false;
        self.flush_unemitted();
        if !self.current_line.is_empty() {
            self.out.push('\n');
        }
        self.current_line.clear();
        self.emitted = 0;
    }
}

impl Perform for LineAssembler {
    fn print(&mut self, c: char) {
        self.resolve_pending_cr();
        self.current_line.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            // Line feed commits the line; a deferred CR was half of CR/LF.
            0x0a => {
                self.pending_cr = false;
                self.commit_line();
            }
            // Defer: the next printable or line feed decides lone vs CR/LF.
            0x0d => {
                self.resolve_pending_cr();
                self.pending_cr = true;
            }
            // Tab is the only other control character kept.
            0x09 => {
                self.resolve_pending_cr();
                self.current_line.push('\t');
            }
            // Remaining C0 controls and DEL are dropped. Dropped bytes do
            // not resolve a deferred CR: `\r BEL \n` is still a CR/LF pair.
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {
        // Ignore DCS sequences
    }

    fn put(&mut self, _byte: u8) {
        // Ignore DCS data
    }

    fn unhook(&mut self) {
        // Ignore DCS end
    }

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {
        // Ignore OSC sequences
    }

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
        // Ignore CSI sequences (cursor movement, colors, etc.)
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {
        // Ignore simple escape sequences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize_all(chunks: &[&str]) -> String {
        let mut sanitizer = StreamSanitizer::new();
        chunks.iter().map(|c| sanitizer.sanitize(c)).collect()
    }

    #[test]
    fn test_plain_text() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("hello world"), "hello world");
    }

    #[test]
    fn test_strip_color_codes() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b[31mred\x1b[0m"), "red");
    }

    #[test]
    fn test_color_and_crlf() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b[31mHello\x1b[0m\r\nWorld"), "Hello\nWorld");
    }

    #[test]
    fn test_preserve_newlines_and_tabs() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("a\tb\nline2\n"), "a\tb\nline2\n");
    }

    #[test]
    fn test_strip_osc_title() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b]0;Window Title\x07content"), "content");
    }

    #[test]
    fn test_strip_osc_st_terminated() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b]0;title\x1b\\content"), "content");
    }

    #[test]
    fn test_strip_dcs() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1bPq payload\x1b\\after"), "after");
    }

    #[test]
    fn test_single_byte_csi_introducer() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\u{9b}31mred"), "red");
    }

    #[test]
    fn test_drop_bare_control_characters() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("a\x00b\x08c\x0bd\x7fe"), "abcde");
    }

    #[test]
    fn test_csi_split_across_chunks() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b[1"), "");
        assert_eq!(s.sanitize(";2m"), "");
    }

    #[test]
    fn test_escape_split_mid_text() {
        let mut s = StreamSanitizer::new();
        let a = s.sanitize("be\x1b[3");
        let b = s.sanitize("1mred");
        assert_eq!(format!("{a}{b}"), "bered");
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        assert_eq!(sanitize_all(&["abc\r", "\ndef"]), "abc\ndef");
    }

    #[test]
    fn test_lone_cr_overwrites_line() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("ab\rcd"), "ab\ncd");
    }

    #[test]
    fn test_lone_cr_on_empty_line_is_silent() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\rdef"), "def");
    }

    #[test]
    fn test_cr_then_escape_then_lf_is_crlf() {
        // The discarded escape sequence sits between CR and LF; the pair
        // still commits exactly one line.
        assert_eq!(sanitize_all(&["abc\r", "\x1b[0m", "\ndef"]), "abc\ndef");
    }

    #[test]
    fn test_partial_line_visible_then_not_reemitted() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("prompt> "), "prompt> ");
        assert_eq!(s.sanitize(""), "");
        assert_eq!(s.sanitize("ls\n"), "ls\n");
    }

    #[test]
    fn test_empty_input_idempotent() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("abc"), "abc");
        for _ in 0..5 {
            assert_eq!(s.sanitize(""), "");
        }
    }

    #[test]
    fn test_line_break_signal_when_output_empty() {
        // The OSC swallows everything, but the chunk carried a line break.
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b]0;ti\ntle\x07"), "\n");
    }

    #[test]
    fn test_no_signal_for_deferred_cr() {
        // A trailing CR is undecided, so the chunk reports nothing yet.
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\r"), "");
        assert_eq!(s.sanitize("\n"), "\n");
    }

    #[test]
    fn test_chunk_boundary_invariance() {
        let stream = "\x1b[32mok\x1b[0m\r\npro\rgress 100%\r\n\x1b]0;t\x07done\n";
        let mut whole = StreamSanitizer::new();
        let expected = whole.sanitize(stream);

        let chars: Vec<char> = stream.chars().collect();
        for split in 1..chars.len() {
            let a: String = chars[..split].iter().collect();
            let b: String = chars[split..].iter().collect();
            assert_eq!(
                sanitize_all(&[&a, &b]),
                expected,
                "split at char {split} diverged"
            );
        }
    }

    #[test]
    fn test_never_emits_control_bytes() {
        let noisy = "\x1b[31ma\x00b\x1b]0;t\x07\x02c\r\nd\x1b[K\x7f";
        let mut s = StreamSanitizer::new();
        let out = s.sanitize(noisy);
        assert!(out
            .bytes()
            .all(|b| !matches!(b, 0x00..=0x08 | 0x0b | 0x0c | 0x0e..=0x1f | 0x7f)));
    }

    #[test]
    fn test_reset_discards_pending_sequence() {
        let mut s = StreamSanitizer::new();
        assert_eq!(s.sanitize("\x1b[1"), "");
        s.reset();
        // "1m" is no longer part of a CSI sequence after the reset.
        assert_eq!(s.sanitize("1m"), "1m");
    }

    #[test]
    fn test_sanitize_once_basic() {
        assert_eq!(sanitize_once("\x1b[31mfailed\x1b[0m"), "failed");
    }

    #[test]
    fn test_sanitize_once_trailing_cr() {
        assert_eq!(sanitize_once("done\r"), "done\n");
    }

    #[test]
    fn test_sanitize_once_only_line_breaks() {
        assert_eq!(sanitize_once("\r"), "\n");
        assert_eq!(sanitize_once("\x1b]0;a\nb\x07"), "\n");
    }

    #[test]
    fn test_sanitize_once_empty() {
        assert_eq!(sanitize_once(""), "");
    }
}
