use log::*;
use regex::{Captures, Regex};
use std::time::Duration;
use thiserror::Error;

use crate::command::{Action, Command, Screen};
use crate::grid::GridCell;

const NEXT_UNIT_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("no command matches {0:?}")]
    NoMatch(String),
    #[error("{0:?} is not a usable number")]
    InvalidNumber(String),
    #[error("{0:?} is not a board cell")]
    InvalidCell(String),
}

type Built = Result<(String, Vec<Action>), CommandError>;
type Builder = fn(&Captures<'_>, &Screen) -> Built;

struct Rule {
    name: &'static str,
    pattern: Regex,
    build: Builder,
}

/// Ordered pattern table turning chat text into commands.
///
/// Every pattern is anchored at both ends and the first one that matches
/// wins, so the order of `RULES` must not change.
pub struct CommandTable {
    screen: Screen,
    rules: Vec<Rule>,
}

const RULES: [(&str, &str, Builder); 19] = [
    ("click", r"^click$", build_click),
    ("endturn", r"^endturn$", build_end_turn),
    ("undo", r"^undo$", build_undo),
    ("reset", r"^reset$", build_reset),
    ("deselect", r"^(?:deselect|disarm)$", build_deselect),
    ("next", r"^next$", build_next),
    ("next_batch", r"^next ([2-9])$", build_next_batch),
    ("mouse_pixel", r"^mouse ([0-9]+) ([0-9]+)$", build_mouse_pixel),
    ("click_pixel", r"^click ([0-9]+) ([0-9]+)$", build_click_pixel),
    ("mouse_cell", r"^mouse ([a-h])([1-8])$", build_mouse_cell),
    ("click_cell", r"^click ([a-h])([1-8])$", build_click_cell),
    ("select", r"^select (mech|deployed|mission) ([1-3])$", build_select),
    (
        "move",
        r"^move (mech|deployed|mission) ([1-3]) ([a-h])([1-8])$",
        build_move,
    ),
    ("weapon", r"^weapon ([1-2])$", build_weapon),
    (
        "attack",
        r"^attack (mech|deployed|mission) ([1-3]) ([1-2]) ([a-h])([1-8])$",
        build_attack,
    ),
    ("repair", r"^repair ([1-3]) ([a-h])([1-8])$", build_repair),
    ("info", r"^info (on|off)$", build_info),
    ("order", r"^order (on|off)$", build_order),
    ("calibrate", r"^calibrate$", build_calibrate),
];

impl CommandTable {
    pub fn new(screen: Screen) -> Result<CommandTable, regex::Error> {
        let mut rules = Vec::with_capacity(RULES.len());
        for (name, pattern, build) in RULES {
            rules.push(Rule {
                name,
                pattern: Regex::new(pattern)?,
                build,
            });
        }

        Ok(CommandTable { screen, rules })
    }

    /// Builds the command for `input`, or reports why there is none.
    pub fn resolve(&self, input: &str) -> Result<Command, CommandError> {
        let text = input.trim().to_lowercase();

        for rule in &self.rules {
            if let Some(captures) = rule.pattern.captures(&text) {
                let (description, actions) = (rule.build)(&captures, &self.screen)?;
                debug!("{:?} matched rule {}", text, rule.name);
                return Ok(Command {
                    text,
                    description,
                    actions,
                });
            }
        }

        Err(CommandError::NoMatch(text))
    }

    /// Lenient form of `resolve`: anything that does not produce a command
    /// is simply `None`.
    pub fn parse(&self, input: &str) -> Option<Command> {
        match self.resolve(input) {
            Ok(command) => Some(command),
            Err(CommandError::NoMatch(_)) => None,
            Err(err) => {
                debug!("Ignoring {:?}: {}", input, err);
                None
            }
        }
    }
}

fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map_or("", |m| m.as_str())
}

fn number(captures: &Captures<'_>, index: usize) -> Result<i32, CommandError> {
    let raw = group(captures, index);
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

fn cell(captures: &Captures<'_>, column: usize, row: usize) -> Result<GridCell, CommandError> {
    let column = group(captures, column);
    let row = group(captures, row);
    let mut chars = column.chars().chain(row.chars());
    let parsed = match (chars.next(), chars.next(), chars.next()) {
        (Some(c), Some(r), None) => GridCell::new(c, r),
        _ => None,
    };
    parsed.ok_or_else(|| CommandError::InvalidCell(format!("{}{}", column, row)))
}

/// Hotkey for a unit slot. Slots the game has no hotkey for fall back to
/// the first mech.
fn unit_key(class: &str, slot: &str) -> &'static str {
    match (class, slot) {
        ("mech", "1") => "a",
        ("mech", "2") => "s",
        ("mech", "3") => "d",
        ("deployed", "1") => "f",
        ("deployed", "2") => "g",
        ("deployed", "3") => "h",
        ("mission", "1") => "z",
        ("mission", "2") => "x",
        _ => "a",
    }
}

fn weapon_key(slot: &str) -> &'static str {
    match slot {
        "2" => "2",
        _ => "1",
    }
}

fn tap(key: &'static str) -> Action {
    Action::KeyTap { key }
}

fn build_click(_: &Captures<'_>, _: &Screen) -> Built {
    Ok(("Click the mouse".to_string(), vec![Action::Click]))
}

fn build_end_turn(_: &Captures<'_>, _: &Screen) -> Built {
    Ok(("End turn".to_string(), vec![tap("space")]))
}

fn build_undo(_: &Captures<'_>, _: &Screen) -> Built {
    Ok(("Undo move".to_string(), vec![tap("shift")]))
}

fn build_reset(_: &Captures<'_>, _: &Screen) -> Built {
    Ok(("Reset turn".to_string(), vec![tap("backspace")]))
}

fn build_deselect(_: &Captures<'_>, _: &Screen) -> Built {
    Ok(("Deselect weapon".to_string(), vec![tap("q")]))
}

fn build_next(_: &Captures<'_>, _: &Screen) -> Built {
    Ok(("Select next unit".to_string(), vec![tap("tab")]))
}

fn build_next_batch(captures: &Captures<'_>, _: &Screen) -> Built {
    let count = number(captures, 1)?;

    let mut actions = vec![];
    for i in 0..count {
        if i > 0 {
            actions.push(Action::Wait(NEXT_UNIT_PAUSE));
        }
        actions.push(tap("tab"));
    }

    Ok((format!("Select next unit #{}", count), actions))
}

fn build_mouse_pixel(captures: &Captures<'_>, screen: &Screen) -> Built {
    let x = number(captures, 1)?;
    let y = number(captures, 2)?;

    Ok((
        format!("Move the mouse to x: {}, y: {}", x, y),
        vec![screen.pointer(x, y)],
    ))
}

fn build_click_pixel(captures: &Captures<'_>, screen: &Screen) -> Built {
    let x = number(captures, 1)?;
    let y = number(captures, 2)?;

    Ok((
        format!("Click the mouse at x: {}, y: {}", x, y),
        vec![screen.pointer(x, y), Action::Click],
    ))
}

fn build_mouse_cell(captures: &Captures<'_>, screen: &Screen) -> Built {
    let target = cell(captures, 1, 2)?;

    Ok((
        format!("Move the mouse to tile {}", target),
        vec![screen.pointer_to_cell(target)],
    ))
}

fn build_click_cell(captures: &Captures<'_>, screen: &Screen) -> Built {
    let target = cell(captures, 1, 2)?;

    Ok((
        format!("Click the mouse at tile {}", target),
        vec![screen.pointer_to_cell(target), Action::Click],
    ))
}

fn build_select(captures: &Captures<'_>, _: &Screen) -> Built {
    let class = group(captures, 1);
    let slot = group(captures, 2);

    Ok((
        format!("Select {} unit #{}", class, slot),
        vec![tap(unit_key(class, slot))],
    ))
}

fn build_move(captures: &Captures<'_>, screen: &Screen) -> Built {
    let class = group(captures, 1);
    let slot = group(captures, 2);
    let target = cell(captures, 3, 4)?;

    Ok((
        format!("Move {} unit #{} to {}", class, slot, target),
        vec![
            tap(unit_key(class, slot)),
            screen.pointer_to_cell(target),
            Action::Click,
        ],
    ))
}

fn build_weapon(captures: &Captures<'_>, _: &Screen) -> Built {
    let slot = group(captures, 1);

    Ok((format!("Arm weapon #{}", slot), vec![tap(weapon_key(slot))]))
}

fn build_attack(captures: &Captures<'_>, screen: &Screen) -> Built {
    let class = group(captures, 1);
    let slot = group(captures, 2);
    let weapon = group(captures, 3);
    let target = cell(captures, 4, 5)?;

    Ok((
        format!(
            "Attacking with {} unit #{} using weapon {} on tile {}",
            class, slot, weapon, target
        ),
        vec![
            tap(unit_key(class, slot)),
            tap(weapon_key(weapon)),
            screen.pointer_to_cell(target),
            Action::Click,
        ],
    ))
}

fn build_repair(captures: &Captures<'_>, screen: &Screen) -> Built {
    let slot = group(captures, 1);
    let target = cell(captures, 2, 3)?;

    Ok((
        format!("Repairing mech #{} at tile {}", slot, target),
        vec![
            tap(unit_key("mech", slot)),
            tap("r"),
            screen.pointer_to_cell(target),
            Action::Click,
        ],
    ))
}

fn build_info(captures: &Captures<'_>, _: &Screen) -> Built {
    let state = group(captures, 1);

    Ok((
        format!("Turning info tooltip {}", state),
        vec![Action::KeyHold {
            key: "control",
            pressed: state == "on",
        }],
    ))
}

fn build_order(captures: &Captures<'_>, _: &Screen) -> Built {
    let state = group(captures, 1);

    Ok((
        format!("Turning turn order tooltips {}", state),
        vec![Action::KeyHold {
            key: "alt",
            pressed: state == "on",
        }],
    ))
}

// sweeps the corners of the window and the board so offsets can be checked by eye
fn build_calibrate(_: &Captures<'_>, screen: &Screen) -> Built {
    let mut actions = vec![screen.pointer(0, 0), screen.pointer(screen.width, screen.height)];
    for (column, row) in [('A', '1'), ('H', '1'), ('H', '8'), ('A', '8')] {
        if let Some(target) = GridCell::new(column, row) {
            actions.push(screen.pointer_to_cell(target));
        }
    }

    Ok(("Calibrating".to_string(), actions))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAMMAR: [&str; 27] = [
        "click",
        "click 10 20",
        "click c3",
        "mouse 100 100",
        "mouse h8",
        "select mech 1",
        "select deployed 3",
        "select mission 2",
        "move mech 2 b4",
        "weapon 1",
        "weapon 2",
        "attack mech 1 2 a1",
        "attack mission 1 1 h8",
        "repair 3 d5",
        "info on",
        "info off",
        "order on",
        "order off",
        "endturn",
        "undo",
        "reset",
        "deselect",
        "disarm",
        "next",
        "next 2",
        "next 9",
        "calibrate",
    ];

    fn table() -> CommandTable {
        CommandTable::new(Screen::default()).unwrap()
    }

    fn actions(input: &str) -> Vec<Action> {
        table().parse(input).unwrap().actions
    }

    #[test]
    fn every_grammar_form_builds_actions() {
        let table = table();
        for input in GRAMMAR {
            let command = table.parse(input);
            assert!(command.is_some(), "{input} did not parse");
            assert!(!command.unwrap().actions.is_empty(), "{input} has no actions");
        }
    }

    #[test]
    fn exactly_one_rule_matches_each_form() {
        let table = table();
        for input in GRAMMAR {
            let matching: Vec<&str> = table
                .rules
                .iter()
                .filter(|rule| rule.pattern.is_match(input))
                .map(|rule| rule.name)
                .collect();
            assert_eq!(matching.len(), 1, "{input} matched {matching:?}");
        }
    }

    #[test]
    fn unknown_input_is_ignored() {
        let table = table();
        for input in [
            "",
            "hello chat",
            "clicks",
            "click i1",
            "click a9",
            "mouse 100",
            "mouse -5 10",
            "select mech 4",
            "weapon 3",
            "next 1",
            "next 10",
            "xdeselect",
            "disarmed",
            "deselect and disarm",
            "info maybe",
            "repair 1 a",
        ] {
            assert_eq!(table.parse(input), None, "{input:?} should not parse");
            assert!(matches!(table.resolve(input), Err(CommandError::NoMatch(_))));
        }
    }

    #[test]
    fn input_is_normalized() {
        let command = table().parse("  CLICK B2\r\n").unwrap();
        assert_eq!(command.text, "click b2");
        assert_eq!(command.description, "Click the mouse at tile B2");
    }

    #[test]
    fn oversized_number_is_rejected() {
        assert_eq!(
            table().resolve("mouse 99999999999 1"),
            Err(CommandError::InvalidNumber("99999999999".to_string()))
        );
        assert_eq!(table().parse("click 1 99999999999"), None);
    }

    #[test]
    fn descriptions_follow_arguments() {
        let table = table();
        let cases = [
            ("mouse 100 100", "Move the mouse to x: 100, y: 100"),
            ("click 5 6", "Click the mouse at x: 5, y: 6"),
            ("mouse a1", "Move the mouse to tile A1"),
            ("select deployed 2", "Select deployed unit #2"),
            ("move mission 1 g7", "Move mission unit #1 to G7"),
            ("weapon 2", "Arm weapon #2"),
            (
                "attack mech 1 1 a1",
                "Attacking with mech unit #1 using weapon 1 on tile A1",
            ),
            ("repair 2 c3", "Repairing mech #2 at tile C3"),
            ("info on", "Turning info tooltip on"),
            ("order off", "Turning turn order tooltips off"),
            ("next 4", "Select next unit #4"),
            ("disarm", "Deselect weapon"),
        ];

        for (input, description) in cases {
            assert_eq!(table.parse(input).unwrap().description, description);
        }
    }

    #[test]
    fn phrasing_does_not_change_description() {
        let table = table();
        let deselect = table.parse("deselect").unwrap();
        let disarm = table.parse("disarm").unwrap();
        assert_ne!(deselect.text, disarm.text);
        assert_eq!(deselect.vote_key(), disarm.vote_key());
    }

    #[test]
    fn attack_is_select_arm_aim_click() {
        assert_eq!(
            actions("attack deployed 3 2 h1"),
            vec![
                Action::KeyTap { key: "h" },
                Action::KeyTap { key: "2" },
                Action::MoveTo { x: 1032, y: 425 },
                Action::Click,
            ]
        );
    }

    #[test]
    fn repair_always_selects_a_mech() {
        assert_eq!(
            actions("repair 2 a1"),
            vec![
                Action::KeyTap { key: "s" },
                Action::KeyTap { key: "r" },
                Action::MoveTo { x: 640, y: 712 },
                Action::Click,
            ]
        );
    }

    #[test]
    fn unit_without_hotkey_falls_back_to_first_mech() {
        assert_eq!(actions("select mission 3"), vec![Action::KeyTap { key: "a" }]);
    }

    #[test]
    fn overlays_hold_and_release_keys() {
        assert_eq!(
            actions("info on"),
            vec![Action::KeyHold { key: "control", pressed: true }]
        );
        assert_eq!(
            actions("order off"),
            vec![Action::KeyHold { key: "alt", pressed: false }]
        );
    }

    #[test]
    fn next_batch_pauses_between_taps() {
        assert_eq!(
            actions("next 3"),
            vec![
                Action::KeyTap { key: "tab" },
                Action::Wait(NEXT_UNIT_PAUSE),
                Action::KeyTap { key: "tab" },
                Action::Wait(NEXT_UNIT_PAUSE),
                Action::KeyTap { key: "tab" },
            ]
        );
    }

    #[test]
    fn pixel_commands_are_clamped() {
        assert_eq!(
            actions("click 2000 30"),
            vec![Action::MoveTo { x: 1180, y: 75 }, Action::Click]
        );
    }

    #[test]
    fn calibrate_sweeps_reference_points() {
        assert_eq!(
            actions("calibrate"),
            vec![
                Action::MoveTo { x: 0, y: 45 },
                Action::MoveTo { x: 1280, y: 765 },
                Action::MoveTo { x: 640, y: 712 },
                Action::MoveTo { x: 1032, y: 425 },
                Action::MoveTo { x: 640, y: 138 },
                Action::MoveTo { x: 248, y: 425 },
            ]
        );
    }
}
