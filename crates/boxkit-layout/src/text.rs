//! Text boxes.
//!
//! A text box renders a slice `[text_start, text_end)` of the whitespace
//! processed text of its node. Layout places as many words as fit into the
//! offered width and hands the remaining text over as a continuation box.
//! Preserved line breaks are stored as `'\n'` in the processed text.

use boxkit_css::WhiteSpace;

use crate::context::VisualContext;
use crate::manager::{LayoutCx, LayoutManager, LayoutOutcome};
use crate::tree::{BoxId, LayoutBox};
use crate::{Rect, Size};

const LINE_BREAK: char = '\n';

/// Text state of a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    /// Whitespace processed text of the whole node.
    pub text: String,
    pub text_start: usize,
    pub text_end: usize,
    /// Sequences of spaces collapse into one.
    pub collapse_ws: bool,
    /// Lines may wrap at spaces.
    pub split_ws: bool,
    /// Line feeds are ordinary whitespace.
    pub line_ws: bool,
    pub min_width: f32,
    pub max_width: f32,
    pub first_line_length: f32,
    pub last_line_length: f32,
    pub longest_line_length: f32,
    pub contains_line_break: bool,
    /// Extra advance of every space, set by justified lines.
    pub word_spacing: f32,
}

impl TextData {
    /// Process `raw` according to `white_space` and measure it with `ctx`.
    pub fn new(raw: &str, white_space: WhiteSpace, ctx: &VisualContext) -> Self {
        let mut data = Self {
            text: String::new(),
            text_start: 0,
            text_end: 0,
            split_ws: white_space.allows_wrapping(),
            collapse_ws: white_space.collapses_spaces(),
            line_ws: !white_space.preserves_line_breaks(),
            min_width: 0.0,
            max_width: 0.0,
            first_line_length: 0.0,
            last_line_length: 0.0,
            longest_line_length: 0.0,
            contains_line_break: false,
            word_spacing: 0.0,
        };
        data.text = data.collapse_whitespace(raw);
        data.text_end = data.text.len();
        data.compute_line_lengths(ctx);
        data.max_width = data.compute_maximal_width(ctx);
        data.min_width = data.compute_minimal_width(ctx);
        data
    }

    /// The text currently assigned to the box.
    pub fn current(&self) -> &str {
        let end = self.text_end.min(self.text.len());
        &self.text[self.text_start.min(end)..end]
    }

    fn is_whitespace(&self, ch: char) -> bool {
        if self.line_ws {
            ch.is_whitespace()
        } else {
            ch != '\n' && ch != '\r' && ch.is_whitespace()
        }
    }

    fn is_line_break(&self, ch: char) -> bool {
        !self.line_ws && (ch == '\r' || ch == '\n')
    }

    fn collapse_whitespace(&self, src: &str) -> String {
        let mut ret = String::with_capacity(src.len());
        let mut in_ws = false;
        let mut chars = src.chars().peekable();
        while let Some(ch) = chars.next() {
            if self.collapse_ws && self.is_whitespace(ch) {
                if !in_ws {
                    ret.push(' ');
                    in_ws = true;
                }
            } else if self.is_line_break(ch) {
                ret.push(LINE_BREAK);
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            } else {
                in_ws = false;
                ret.push(ch);
            }
        }
        ret
    }

    fn compute_line_lengths(&mut self, ctx: &VisualContext) {
        let mut first = None;
        let mut longest = 0.0f32;
        let mut last = 0.0;
        let mut breaks = false;
        for (i, line) in self.current().split(LINE_BREAK).enumerate() {
            breaks |= i > 0;
            let w = ctx.string_width(line);
            first.get_or_insert(w);
            longest = longest.max(w);
            last = w;
        }
        self.first_line_length = first.unwrap_or(0.0);
        self.last_line_length = last;
        self.longest_line_length = longest;
        self.contains_line_break = breaks;
    }

    fn compute_maximal_width(&mut self, ctx: &VisualContext) -> f32 {
        if self.line_ws {
            let len = ctx.string_width(self.current());
            self.first_line_length = len;
            self.last_line_length = len;
            self.longest_line_length = len;
            len
        } else {
            self.longest_line_length
        }
    }

    fn compute_minimal_width(&self, ctx: &VisualContext) -> f32 {
        let t = self.current();
        if t.is_empty() {
            0.0
        } else if self.split_ws {
            t.split(|c| c == ' ' || c == LINE_BREAK)
                .map(|word| ctx.string_width(word))
                .fold(0.0, f32::max)
        } else {
            self.longest_line_length
        }
    }

    pub fn can_split_before(&self) -> bool {
        let bytes = self.text.as_bytes();
        self.text_end > self.text_start
            && (bytes[self.text_start] == b' '
                || (self.text_start > 0 && bytes[self.text_start - 1] == b' '))
    }

    pub fn can_split_after(&self) -> bool {
        let bytes = self.text.as_bytes();
        self.text_end > self.text_start
            && (bytes[self.text_end - 1] == b' '
                || (self.text_end < bytes.len() && bytes[self.text_end] == b' '))
    }

    /// Byte index of the first character at or after `from` that is not
    /// collapsible whitespace or a line break.
    fn next_content(&self, from: usize) -> usize {
        let skipped: usize = self.text[from..]
            .chars()
            .take_while(|&ch| {
                (self.collapse_ws && self.is_whitespace(ch)) || self.is_line_break(ch)
            })
            .map(char::len_utf8)
            .sum();
        from + skipped
    }

    /// Fit the text from `text_start` into `wlimit`. Returns the end of the
    /// placed text, its size, whether the rest continues and whether a
    /// preserved line break ended the placed part.
    fn fit(
        &mut self,
        ctx: &VisualContext,
        wlimit: f32,
        force: bool,
        skip_leading: bool,
        line_start: bool,
    ) -> Fitting {
        let empty = self.text.trim().is_empty();
        let mut split = false;
        let mut allow = false;
        let mut end = self.text.len();
        let line_end = self.text[self.text_start..].find(LINE_BREAK).map(|p| self.text_start + p);
        if let Some(le) = line_end {
            end = le;
            split = true;
            allow = true;
        }
        let (mut w, mut h) = (0.0, 0.0);
        if !empty || !line_start {
            if skip_leading && self.collapse_ws {
                let skipped: usize = self.text[self.text_start..end]
                    .chars()
                    .take_while(|&ch| self.is_whitespace(ch))
                    .map(char::len_utf8)
                    .sum();
                self.text_start += skipped;
            }
            loop {
                w = ctx.string_width(&self.text[self.text_start..end]);
                h = ctx.font_height();
                if w > wlimit {
                    if empty {
                        w = 0.0;
                        h = 0.0;
                        split = false;
                        break;
                    }
                    let mut word_end = self.text[..end].rfind(' ').unwrap_or(0);
                    while word_end > 0 && self.text.as_bytes()[word_end - 1] == b' ' {
                        word_end -= 1;
                    }
                    if word_end <= self.text_start || !self.split_ws {
                        if !force {
                            end = self.text_start;
                            w = 0.0;
                            h = 0.0;
                            split = false;
                            allow = false;
                        } else {
                            split = true;
                        }
                        break;
                    }
                    end = word_end;
                    split = true;
                }
                if !(end > self.text_start && w > wlimit) {
                    break;
                }
            }
        }
        self.text_end = end;
        Fitting {
            width: w,
            height: h,
            split,
            by_line_break: allow && line_end == Some(end),
            fits: end > self.text_start || empty || allow,
        }
    }
}

struct Fitting {
    width: f32,
    height: f32,
    split: bool,
    by_line_break: bool,
    fits: bool,
}

/// Layout of text boxes.
pub struct TextLayout;

impl LayoutManager for TextLayout {
    fn layout(
        &self,
        cx: &mut LayoutCx<'_>,
        id: BoxId,
        avail_width: f32,
        force: bool,
        line_start: bool,
    ) -> LayoutOutcome {
        let tree = &mut *cx.tree;
        let b = &mut tree[id];
        if !b.displayed {
            b.content = Size::zero();
            b.bounds = Rect::zero();
            return LayoutOutcome::fit();
        }
        b.avail_width = avail_width;
        let skip_leading = line_start || b.inline.ignore_initial_ws;
        let LayoutBox {
            kind, ctx, inline, ..
        } = b;
        let Some(data) = kind.text_mut() else {
            return LayoutOutcome::fit();
        };
        data.word_spacing = 0.0;
        let fitting = data.fit(ctx, avail_width, force, skip_leading, line_start);
        let next = if fitting.split { data.next_content(data.text_end) } else { data.text.len() };
        let has_rest = next < data.text.len();
        inline.finished_by_line_break = fitting.by_line_break;
        inline.collapsed = fitting.height == 0.0;
        b.content = Size::new(fitting.width, fitting.height);
        b.set_size(fitting.width, fitting.height);

        let rest = if has_rest {
            let copy = tree.copy_box(id);
            let c = &mut tree[copy];
            c.inline.ignore_initial_ws = false;
            c.inline.finished_by_line_break = false;
            if let Some(data) = c.kind.text_mut() {
                data.text_start = next;
                data.text_end = data.text.len();
            }
            Some(copy)
        } else {
            None
        };
        LayoutOutcome {
            fits: fitting.fits,
            rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FontSpec, MonospaceMeasurer};
    use std::sync::Arc;

    // every character is 10px wide, font height 20
    fn ctx() -> VisualContext {
        VisualContext::new(
            Arc::new(MonospaceMeasurer::default()),
            FontSpec::new("serif", 20.0),
            Size::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_collapse_whitespace_normal() {
        let data = TextData::new("  hello \n\t world ", WhiteSpace::Normal, &ctx());
        assert_eq!(data.text, " hello world ");
        assert!(!data.contains_line_break);
        assert_eq!(data.max_width, 130.0);
        assert_eq!(data.min_width, 50.0);
    }

    #[test]
    fn test_pre_keeps_spaces_and_breaks() {
        let data = TextData::new("ab  c\r\nlonger", WhiteSpace::Pre, &ctx());
        assert_eq!(data.text, "ab  c\nlonger");
        assert!(data.contains_line_break);
        assert_eq!(data.first_line_length, 50.0);
        assert_eq!(data.last_line_length, 60.0);
        assert_eq!(data.max_width, 60.0);
        assert_eq!(data.min_width, 60.0);
    }

    #[test]
    fn test_pre_line_collapses_spaces_but_keeps_breaks() {
        let data = TextData::new("a   b\nc", WhiteSpace::PreLine, &ctx());
        assert_eq!(data.text, "a b\nc");
        assert!(data.contains_line_break);
    }

    #[test]
    fn test_split_predicates() {
        let mut data = TextData::new("one two", WhiteSpace::Normal, &ctx());
        assert!(!data.can_split_before());
        assert!(!data.can_split_after());
        data.text_start = 4;
        assert!(data.can_split_before());
        data.text_start = 0;
        data.text_end = 3;
        assert!(data.can_split_after());
    }

    #[test]
    fn test_fit_breaks_at_last_space() {
        let ctx = ctx();
        let mut data = TextData::new("aaa bbb ccc", WhiteSpace::Normal, &ctx);
        let f = data.fit(&ctx, 75.0, false, true, true);
        assert!(f.fits && f.split);
        assert_eq!(data.current(), "aaa bbb");
        assert_eq!(f.width, 70.0);
        assert_eq!(data.next_content(data.text_end), 8);
    }

    #[test]
    fn test_fit_without_force_places_nothing() {
        let ctx = ctx();
        let mut data = TextData::new("unbreakable", WhiteSpace::Normal, &ctx);
        let f = data.fit(&ctx, 50.0, false, true, true);
        assert!(!f.fits);
        assert_eq!(f.width, 0.0);
        let f = data.fit(&ctx, 50.0, true, true, true);
        assert!(f.fits);
        assert_eq!(f.width, 110.0);
    }

    #[test]
    fn test_whitespace_at_line_start_collapses() {
        let ctx = ctx();
        let mut data = TextData::new("   ", WhiteSpace::Normal, &ctx);
        let f = data.fit(&ctx, 100.0, false, true, true);
        assert!(f.fits);
        assert_eq!((f.width, f.height), (0.0, 0.0));
    }

    #[test]
    fn test_preserved_break_finishes_line() {
        let ctx = ctx();
        let mut data = TextData::new("ab\ncd", WhiteSpace::Pre, &ctx);
        let f = data.fit(&ctx, 500.0, false, true, true);
        assert!(f.fits && f.split && f.by_line_break);
        assert_eq!(data.current(), "ab");
        assert_eq!(data.next_content(data.text_end), 3);
    }
}
