//! Line assembly for the process tree.
//!
//! The renderer knows nothing about processes. The tree walker feeds it one
//! node at a time (connector position, display text, highlight, repeat
//! count, arguments) and it turns that into width-limited lines:
//!
//! ```text
//! Idle -> indentation -> [N*[] -> name -> [args] -> newline | flush -> Idle
//! ```
//!
//! A stack of [`Branch`] markers remembers, per ancestor level, how far to
//! indent and whether that level already drew its final elbow, so deeper
//! lines know whether to continue a vertical bar or leave a gap.

pub mod glyphs;

pub use glyphs::{select_style, GlyphStyle, Glyphs};

use crate::config::Config;
use crate::visual;
use std::io::{self, Write};

const ENTER_GRAPHICS: &str = "\x1b(0\x0f";
const EXIT_GRAPHICS: &str = "\x1b(B\x0f";
const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[22m";
const ARGUMENT_MARKER: &str = " ...";

/// How a segment must be wrapped when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    BoxDrawing,
    Bright,
}

#[derive(Debug)]
struct Segment {
    width: usize,
    escape: Escape,
    text: String,
}

#[derive(Debug)]
struct Branch {
    indentation: String,
    done: bool,
}

impl Branch {
    fn new(indentation: usize) -> Self {
        Branch {
            indentation: " ".repeat(indentation),
            done: false,
        }
    }
}

/// Writes the tree one line at a time.
pub struct Renderer<'c, W: Write> {
    config: &'c Config,
    glyphs: Glyphs,
    out: W,
    max_width: Option<usize>,
    width: usize,
    overflow: bool,
    segments: Vec<Segment>,
    branches: Vec<Branch>,
    first: bool,
    last: bool,
    /// Branch depth of every repeat bracket still waiting for its `]`.
    open_brackets: Vec<usize>,
    lines: usize,
}

impl<'c, W: Write> Renderer<'c, W> {
    pub fn new(config: &'c Config, out: W) -> Self {
        Renderer {
            config,
            glyphs: Glyphs::for_style(config.glyph_style),
            out,
            max_width: config.max_width.filter(|&w| w > 0),
            width: 0,
            overflow: false,
            segments: Vec::new(),
            branches: Vec::new(),
            first: true,
            last: true,
            open_brackets: Vec::new(),
            lines: 0,
        }
    }

    /// Set where the next node sits among its rendered siblings.
    pub fn position(&mut self, first: bool, last: bool) {
        self.first = first;
        self.last = last;
    }

    /// Start a node: connectors, optional `N*[` prefix, and its display text.
    pub fn node(&mut self, text: &str, highlight: bool, duplicates: usize) {
        let escape = if self.glyphs.graphics_mode {
            Escape::BoxDrawing
        } else {
            Escape::None
        };
        let g = self.glyphs;

        let mut connectors: Vec<(usize, String)> = Vec::new();
        if !self.first || self.config.show_arguments {
            let last_index = self.branches.len().wrapping_sub(1);
            for (index, branch) in self.branches.iter_mut().enumerate() {
                let width = branch.indentation.len() + 2;
                let piece = if index == last_index {
                    let line = if self.last {
                        branch.done = true;
                        g.up_and_right
                    } else {
                        g.vertical_and_right
                    };
                    format!("{}{}{}", branch.indentation, line, g.horizontal)
                } else {
                    let line = if branch.done { ' ' } else { g.vertical };
                    format!("{}{} ", branch.indentation, line)
                };
                connectors.push((width, piece));
            }
        } else if let Some(branch) = self.branches.last_mut() {
            let line = if self.last {
                branch.done = true;
                g.horizontal
            } else {
                g.down_and_horizontal
            };
            connectors.push((3, format!("{h}{line}{h}", h = g.horizontal)));
        }
        for (width, piece) in connectors {
            self.push(width, escape, piece);
        }

        let mut prefix = 0;
        if duplicates > 1 {
            let opening = format!("{duplicates}*[");
            prefix = opening.len();
            self.push(prefix, Escape::None, opening);
            self.open_brackets.push(self.branches.len());
        }

        let width = visual::width(text);
        let escape = if highlight { Escape::Bright } else { Escape::None };
        self.push(width, escape, text.to_string());

        let indentation = if self.config.show_arguments {
            2
        } else {
            prefix + width + 1
        };
        self.branches.push(Branch::new(indentation));
    }

    /// Append one argument, truncating with ` ...` once the width runs out.
    ///
    /// A non-final argument that would leave no room for the marker is cut
    /// early so the marker always fits. When fewer than four columns remain,
    /// the end of the line gives way to the marker.
    pub fn argument(&mut self, arg: &str, last: bool) {
        if self.overflow {
            return;
        }

        let width = visual::width(arg) + 1;
        let end = self.width + width;
        let fits = match self.max_width {
            None => true,
            Some(max) => end <= max && (last || end + 3 < max),
        };
        if fits {
            self.width = end;
            self.segments.push(Segment {
                width,
                escape: Escape::None,
                text: format!(" {arg}"),
            });
            return;
        }

        let max = self.max_width.unwrap_or(end);
        self.overflow = true;
        let room = max.saturating_sub(self.width);
        let (text, text_width) = if room > ARGUMENT_MARKER.len() {
            let (head, head_width) = visual::take_columns(arg, room - ARGUMENT_MARKER.len());
            (format!(" {head}..."), head_width + ARGUMENT_MARKER.len())
        } else {
            self.trim_to(max.saturating_sub(ARGUMENT_MARKER.len()));
            let (marker, marker_width) = visual::take_columns(ARGUMENT_MARKER, max);
            (marker.to_string(), marker_width)
        };
        self.width += text_width;
        self.segments.push(Segment {
            width: text_width,
            escape: Escape::None,
            text,
        });
    }

    /// The node's own text (and arguments) are complete.
    ///
    /// With arguments shown every node owns a line, so the line ends here;
    /// otherwise lines only end at leaves, from [`Renderer::pop`].
    pub fn node_done(&mut self, leaf: bool) -> io::Result<()> {
        if self.config.show_arguments {
            let depth = self.branches.len().saturating_sub(1);
            self.end_line(depth, leaf)?;
        }
        Ok(())
    }

    /// Leave a node after all of its children were rendered.
    pub fn pop(&mut self, has_children: bool) -> io::Result<()> {
        self.branches.pop();
        if !self.config.show_arguments && !has_children {
            let depth = self.branches.len();
            self.end_line(depth, true)?;
        }
        Ok(())
    }

    /// Flush the output and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    /// Number of lines terminated so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    fn push(&mut self, width: usize, escape: Escape, text: String) {
        if self.overflow {
            return;
        }

        let used = self.width;
        match self.max_width {
            Some(max) if used + width > max => {
                self.overflow = true;
                let room = max.saturating_sub(used);
                if room > 0 {
                    let (cut, cut_width) = cut_with_marker(&text, room);
                    self.width = used + cut_width;
                    self.segments.push(Segment {
                        width: cut_width,
                        escape,
                        text: cut,
                    });
                } else if let Some(previous) = self.segments.last_mut() {
                    // The line is already full; mark the cut on what is there.
                    let (cut, cut_width) = cut_with_marker(&previous.text, previous.width);
                    self.width = used - previous.width + cut_width;
                    previous.text = cut;
                    previous.width = cut_width;
                }
            }
            _ => {
                self.width = used + width;
                self.segments.push(Segment { width, escape, text });
            }
        }
    }

    /// Drop columns from the end of the line until it is at most `columns`
    /// wide.
    fn trim_to(&mut self, columns: usize) {
        while self.width > columns {
            let Some(last) = self.segments.last_mut() else {
                break;
            };
            let excess = self.width - columns;
            if last.width <= excess {
                self.width -= last.width;
                self.segments.pop();
            } else {
                let (head, head_width) = visual::take_columns(&last.text, last.width - excess);
                self.width -= last.width - head_width;
                last.text = head.to_string();
                last.width = head_width;
            }
        }
    }

    /// Close every repeat bracket whose subtree ends on this line, then write
    /// the line out.
    fn end_line(&mut self, depth: usize, leaf: bool) -> io::Result<()> {
        if leaf {
            let mut closing = 0;
            while let Some(&level) = self.open_brackets.last() {
                let finished = self
                    .branches
                    .get(level..depth)
                    .is_none_or(|levels| levels.iter().all(|b| b.done));
                if !finished {
                    break;
                }
                self.open_brackets.pop();
                closing += 1;
            }
            if closing > 0 {
                self.push(closing, Escape::None, "]".repeat(closing));
            }
        }

        let mut line = String::new();
        let count = self.segments.len();
        for (index, segment) in self.segments.iter().enumerate() {
            let (begin, end) = match segment.escape {
                Escape::BoxDrawing => {
                    let joins_previous =
                        index > 0 && self.segments[index - 1].escape == Escape::BoxDrawing;
                    let joins_next =
                        index + 1 < count && self.segments[index + 1].escape == Escape::BoxDrawing;
                    (
                        if joins_previous { "" } else { ENTER_GRAPHICS },
                        if joins_next { "" } else { EXIT_GRAPHICS },
                    )
                }
                Escape::Bright => (BOLD_ON, BOLD_OFF),
                Escape::None => ("", ""),
            };
            line.push_str(begin);
            line.push_str(&segment.text);
            line.push_str(end);
        }
        self.out.write_all(line.as_bytes())?;

        // On terminals that wrap immediately at the last column, a newline
        // after a full line would leave a blank one.
        if self.config.newline_hazard && self.max_width == Some(self.width) {
            self.out.flush()?;
        } else {
            self.out.write_all(b"\n")?;
        }

        self.segments.clear();
        self.width = 0;
        self.overflow = false;
        self.lines += 1;
        Ok(())
    }
}

/// Keep what fits in `width - 1` columns and mark the cut with `+`.
fn cut_with_marker(text: &str, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let (head, head_width) = visual::take_columns(text, width - 1);
    (format!("{head}+"), head_width + 1)
}
