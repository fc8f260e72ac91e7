//! Line-fitting printer for [`Doc`]s.
//!
//! Groups are printed flat when their contents, and everything after them up
//! to the next possible line break, fit in the remaining width. Otherwise they
//! break and their lines become newlines.

use std::collections::HashMap;

use super::{Doc, GroupId, LineKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Break,
    Flat,
}

/// A piece of work for the printer. Fill rests and content pairs are slices
/// of the fill's parts, so no document is copied while printing.
#[derive(Debug, Clone, Copy)]
enum Item<'a> {
    Doc(&'a Doc),
    Concat(&'a [Doc]),
    Fill(&'a [Doc]),
}

#[derive(Debug, Clone, Copy)]
struct Command<'a> {
    indent: usize,
    mode: Mode,
    item: Item<'a>,
}

impl<'a> Command<'a> {
    fn new(indent: usize, mode: Mode, item: Item<'a>) -> Self {
        Self { indent, mode, item }
    }
}

/// Prints `doc` within `print_width` columns, indenting by `tab_width` spaces.
pub fn render(doc: &Doc, print_width: usize, tab_width: usize) -> String {
    let mut doc = doc.clone();
    propagate_breaks(&mut doc);
    Printer {
        width: print_width as isize,
        tab_width,
        out: String::new(),
        pos: 0,
        group_modes: HashMap::new(),
    }
    .print(&doc)
}

/// Marks every group containing a forced break as broken. Returns whether
/// `doc` itself contains one.
fn propagate_breaks(doc: &mut Doc) -> bool {
    match doc {
        Doc::BreakParent | Doc::Line(LineKind::Hard | LineKind::Literal) => true,
        Doc::Group {
            should_break,
            contents,
            ..
        } => {
            let inner = propagate_breaks(contents);
            *should_break |= inner;
            *should_break
        }
        Doc::Concat(parts) | Doc::Fill(parts) => {
            let mut any = false;
            for part in parts {
                any |= propagate_breaks(part);
            }
            any
        }
        Doc::Indent(contents) | Doc::DedentToRoot(contents) => propagate_breaks(contents),
        Doc::IfBreak {
            break_contents,
            flat_contents,
            ..
        } => {
            let broken = propagate_breaks(break_contents);
            propagate_breaks(flat_contents) | broken
        }
        Doc::Text(_) | Doc::Line(_) => false,
    }
}

fn text_width(text: &str) -> isize {
    text.chars().count() as isize
}

struct Printer {
    width: isize,
    tab_width: usize,
    out: String,
    pos: isize,
    group_modes: HashMap<GroupId, Mode>,
}

impl Printer {
    fn print(mut self, doc: &Doc) -> String {
        let mut commands = vec![Command::new(0, Mode::Break, Item::Doc(doc))];
        let mut should_remeasure = false;

        while let Some(command) = commands.pop() {
            let Command { indent, mode, item } = command;
            let doc = match item {
                Item::Doc(doc) => doc,
                Item::Concat(parts) => {
                    push_parts(&mut commands, indent, mode, parts);
                    continue;
                }
                Item::Fill(parts) => {
                    self.print_fill(&mut commands, indent, mode, parts);
                    continue;
                }
            };

            match doc {
                Doc::Text(text) => {
                    self.out.push_str(text);
                    self.pos += text_width(text);
                }
                Doc::Concat(parts) => push_parts(&mut commands, indent, mode, parts),
                Doc::Indent(contents) => {
                    commands.push(Command::new(indent + self.tab_width, mode, Item::Doc(contents)))
                }
                Doc::DedentToRoot(contents) => {
                    commands.push(Command::new(0, mode, Item::Doc(contents)))
                }
                Doc::Group {
                    id,
                    should_break,
                    contents,
                } => {
                    let group_mode = match mode {
                        Mode::Flat if !should_remeasure => {
                            if *should_break {
                                Mode::Break
                            } else {
                                Mode::Flat
                            }
                        }
                        _ => {
                            should_remeasure = false;
                            let flat = Command::new(indent, Mode::Flat, Item::Doc(contents));
                            if !*should_break
                                && self.fits(flat, &commands, self.width - self.pos, false)
                            {
                                Mode::Flat
                            } else {
                                Mode::Break
                            }
                        }
                    };
                    commands.push(Command::new(indent, group_mode, Item::Doc(contents)));
                    if let Some(id) = id {
                        log::trace!("group {id:?} printed {group_mode:?}");
                        self.group_modes.insert(*id, group_mode);
                    }
                }
                Doc::Fill(parts) => self.print_fill(&mut commands, indent, mode, parts),
                Doc::IfBreak {
                    break_contents,
                    flat_contents,
                    group_id,
                } => {
                    let contents = match self.group_mode(*group_id, mode) {
                        Mode::Break => break_contents,
                        Mode::Flat => flat_contents,
                    };
                    commands.push(Command::new(indent, mode, Item::Doc(contents)));
                }
                Doc::Line(kind) => {
                    if mode == Mode::Flat {
                        match kind {
                            LineKind::Soft => continue,
                            LineKind::Normal => {
                                self.out.push(' ');
                                self.pos += 1;
                                continue;
                            }
                            LineKind::Hard | LineKind::Literal => should_remeasure = true,
                        }
                    }
                    if *kind == LineKind::Literal {
                        self.out.push('\n');
                        self.pos = 0;
                    } else {
                        self.trim();
                        self.out.push('\n');
                        self.out.extend(std::iter::repeat_n(' ', indent));
                        self.pos = indent as isize;
                    }
                }
                Doc::BreakParent => {}
            }
        }

        self.out
    }

    /// Mode of the group named by `id`. Groups not printed yet count as flat.
    fn group_mode(&self, id: Option<GroupId>, current: Mode) -> Mode {
        match id {
            Some(id) => self.group_modes.get(&id).copied().unwrap_or(Mode::Flat),
            None => current,
        }
    }

    fn print_fill<'a>(
        &self,
        commands: &mut Vec<Command<'a>>,
        indent: usize,
        mode: Mode,
        parts: &'a [Doc],
    ) {
        let remaining = self.width - self.pos;
        let Some(content) = parts.first() else {
            return;
        };
        let content_flat = Command::new(indent, Mode::Flat, Item::Doc(content));
        let content_break = Command::new(indent, Mode::Break, Item::Doc(content));
        let content_fits = self.fits(content_flat, &[], remaining, true);

        let Some(separator) = parts.get(1) else {
            commands.push(if content_fits { content_flat } else { content_break });
            return;
        };
        let separator_flat = Command::new(indent, Mode::Flat, Item::Doc(separator));
        let separator_break = Command::new(indent, Mode::Break, Item::Doc(separator));

        if parts.len() == 2 {
            if content_fits {
                commands.extend([separator_flat, content_flat]);
            } else {
                commands.extend([separator_break, content_break]);
            }
            return;
        }

        let rest = Command::new(indent, mode, Item::Fill(&parts[2..]));
        let pair = Command::new(indent, Mode::Flat, Item::Concat(&parts[..3]));
        if self.fits(pair, &[], remaining, true) {
            commands.extend([rest, separator_flat, content_flat]);
        } else if content_fits {
            commands.extend([rest, separator_break, content_flat]);
        } else {
            commands.extend([rest, separator_break, content_break]);
        }
    }

    /// Whether `next` fits in `width` columns, followed by the rest of the
    /// commands up to their first line break.
    fn fits(&self, next: Command, rest: &[Command], mut width: isize, must_be_flat: bool) -> bool {
        let mut rest_index = rest.len();
        let mut commands = vec![next];

        while width >= 0 {
            let Some(Command { indent, mode, item }) = commands.pop() else {
                if rest_index == 0 {
                    return true;
                }
                rest_index -= 1;
                commands.push(rest[rest_index]);
                continue;
            };

            let doc = match item {
                Item::Doc(doc) => doc,
                Item::Concat(parts) | Item::Fill(parts) => {
                    push_parts(&mut commands, indent, mode, parts);
                    continue;
                }
            };

            match doc {
                Doc::Text(text) => width -= text_width(text),
                Doc::Concat(parts) | Doc::Fill(parts) => {
                    push_parts(&mut commands, indent, mode, parts)
                }
                Doc::Indent(contents) | Doc::DedentToRoot(contents) => {
                    commands.push(Command::new(indent, mode, Item::Doc(contents)))
                }
                Doc::Group {
                    should_break,
                    contents,
                    ..
                } => {
                    if must_be_flat && *should_break {
                        return false;
                    }
                    let group_mode = if *should_break { Mode::Break } else { mode };
                    commands.push(Command::new(indent, group_mode, Item::Doc(contents)));
                }
                Doc::IfBreak {
                    break_contents,
                    flat_contents,
                    group_id,
                } => {
                    let contents = match self.group_mode(*group_id, mode) {
                        Mode::Break => break_contents,
                        Mode::Flat => flat_contents,
                    };
                    commands.push(Command::new(indent, mode, Item::Doc(contents)));
                }
                Doc::Line(kind) => match (mode, kind) {
                    (Mode::Flat, LineKind::Soft) => {}
                    (Mode::Flat, LineKind::Normal) => width -= 1,
                    _ => return true,
                },
                Doc::BreakParent => {}
            }
        }
        false
    }

    /// Drops trailing spaces and tabs before a newline.
    fn trim(&mut self) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
    }
}

fn push_parts<'a>(commands: &mut Vec<Command<'a>>, indent: usize, mode: Mode, parts: &'a [Doc]) {
    commands.extend(
        parts
            .iter()
            .rev()
            .map(|part| Command::new(indent, mode, Item::Doc(part))),
    );
}
