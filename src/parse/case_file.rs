use crate::case::{
    CaseFile, GeometryEntry, VariableEntry, VariableLocation, VariableShape, VariableSource,
};
use crate::prelude::*;

use super::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Format,
    Geometry,
    Variable,
    Time,
    Ignored,
}

impl Section {
    fn name(&self) -> &'static str {
        match self {
            Section::Preamble => "preamble",
            Section::Format => "FORMAT",
            Section::Geometry => "GEOMETRY",
            Section::Variable => "VARIABLE",
            Section::Time => "TIME",
            Section::Ignored => "ignored",
        }
    }
}

/// Parse the text of an Ensight Gold `.case` file
pub fn parse_case(text: &str) -> Result<CaseFile, ParseError> {
    let mut section = Section::Preamble;
    let mut format_seen = false;
    let mut geometry = None;
    let mut variables = Vec::new();
    let mut time_sets = Vec::new();
    let mut pending_time_set: Option<PendingTimeSet> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw_line).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(next) = section_header(line)? {
            if let Some(pending) = pending_time_set.take() {
                time_sets.push(pending.finish()?);
            }
            section = next;
            continue;
        }

        let malformed = || error::MalformedLine::new(section.name(), line_number, line.to_string());

        match section {
            Section::Preamble => return Err(malformed().into()),
            Section::Ignored => continue,
            Section::Format => {
                let (key, value) = split_entry(line).ok_or_else(malformed)?;
                if key == "type" {
                    if value.to_ascii_lowercase() != "ensight gold" {
                        return Err(error::UnsupportedFormat::new("case format", value.into()).into());
                    }
                    format_seen = true;
                }
            }
            Section::Geometry => {
                let (key, value) = split_entry(line).ok_or_else(malformed)?;
                if key == "model" {
                    geometry = Some(parse_model(value).ok_or_else(malformed)??);
                } else {
                    tracing::debug!(entry = key, "ignoring geometry entry");
                }
            }
            Section::Variable => {
                let (key, value) = split_entry(line).ok_or_else(malformed)?;
                if let Some(variable) = parse_variable(key, value).ok_or_else(malformed)?? {
                    variables.push(variable);
                }
            }
            Section::Time => {
                if let Some((key, value)) = split_entry(line) {
                    if key == "time set" {
                        if let Some(pending) = pending_time_set.take() {
                            time_sets.push(pending.finish()?);
                        }
                        pending_time_set = Some(PendingTimeSet::new(value).ok_or_else(malformed)?);
                        continue;
                    }

                    let pending = pending_time_set.as_mut().ok_or_else(malformed)?;
                    pending.entry(key, value).ok_or_else(malformed)??;
                } else {
                    // continuation of a `time values` or `filename numbers` list
                    let pending = pending_time_set.as_mut().ok_or_else(malformed)?;
                    pending.continue_list(line).ok_or_else(malformed)?;
                }
            }
        }
    }

    if let Some(pending) = pending_time_set.take() {
        time_sets.push(pending.finish()?);
    }

    if !format_seen {
        return Err(error::MissingEntry::new("FORMAT", "type").into());
    }

    let geometry = geometry.ok_or(error::MissingEntry::new("GEOMETRY", "model"))?;

    time_sets.sort_by_key(|ts: &TimeSet| ts.id);

    let mut case = CaseFile {
        geometry,
        variables,
        time_sets,
    };

    assign_default_time_sets(&mut case)?;

    Ok(case)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    }
}

fn section_header(line: &str) -> Result<Option<Section>, ParseError> {
    let section = match line {
        "FORMAT" => Section::Format,
        "GEOMETRY" => Section::Geometry,
        "VARIABLE" => Section::Variable,
        "TIME" => Section::Time,
        "FILE" => return Err(error::UnsupportedFormat::new("case section", line.into()).into()),
        "MATERIAL" | "BLOCK_CONTINUATION" | "SCRIPTS" => {
            tracing::warn!(section = line, "ignoring unsupported case file section");
            Section::Ignored
        }
        _ => return Ok(None),
    };

    Ok(Some(section))
}

/// split `key: value`, returning the trimmed halves
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// split leading integer tokens (time set / file set numbers) from the rest
fn leading_numbers<'a>(tokens: &'a [&'a str], keep: usize) -> (Vec<u32>, &'a [&'a str]) {
    let mut numbers = Vec::new();
    let mut rest = tokens;

    while rest.len() > keep {
        match rest[0].parse::<u32>() {
            Ok(number) => {
                numbers.push(number);
                rest = &rest[1..];
            }
            Err(_) => break,
        }
    }

    (numbers, rest)
}

/// `model: [ts] [fs] filename [change_coords_only [cstep]]`
///
/// the outer `Option` is `None` for a malformed line
fn parse_model(value: &str) -> Option<Result<GeometryEntry, ParseError>> {
    let mut tokens: Vec<&str> = value.split_ascii_whitespace().collect();

    let (change_coords_only, connectivity_step) =
        match tokens.iter().position(|t| *t == "change_coords_only") {
            Some(position) => {
                let tail = tokens.split_off(position);
                match &tail[1..] {
                    [] => (true, None),
                    [step] => (true, Some(step.parse().ok()?)),
                    _ => return None,
                }
            }
            None => (false, None),
        };

    let (numbers, rest) = leading_numbers(&tokens, 1);

    if rest.len() != 1 {
        return None;
    }

    if numbers.len() > 1 {
        let err = error::UnsupportedFormat::new("geometry file set", value.into());
        return Some(Err(err.into()));
    }

    Some(Ok(GeometryEntry {
        time_set: numbers.first().copied(),
        filename: rest[0].to_string(),
        change_coords_only,
        connectivity_step,
    }))
}

fn parse_shape(shape: &str) -> Option<VariableShape> {
    let shape = match shape {
        "scalar" => VariableShape::Scalar,
        "vector" => VariableShape::Vector,
        "tensor symm" => VariableShape::TensorSymm,
        "tensor asym" | "tensor9" => VariableShape::TensorAsym,
        _ => return None,
    };
    Some(shape)
}

fn parse_location(location: &str) -> Option<VariableLocation> {
    let location = match location {
        "node" => VariableLocation::Node,
        "element" => VariableLocation::Element,
        "measured node" => VariableLocation::MeasuredNode,
        _ => return None,
    };
    Some(location)
}

/// parse one `VARIABLE` entry.
///
/// the outer `Option` is `None` for a malformed line, the inner one is `None` for
/// entries that are skipped
fn parse_variable(key: &str, value: &str) -> Option<Result<Option<VariableEntry>, ParseError>> {
    let tokens: Vec<&str> = value.split_ascii_whitespace().collect();

    if key.starts_with("complex") {
        tracing::warn!(entry = key, "skipping complex variable");
        return Some(Ok(None));
    }

    if key == "constant per case" {
        let (numbers, rest) = leading_numbers(&tokens, 2);
        let (description, values) = rest.split_first()?;
        let values = values
            .iter()
            .map(|v| v.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .ok()?;

        if numbers.len() > 1 || values.is_empty() {
            return None;
        }

        return Some(Ok(Some(VariableEntry {
            shape: VariableShape::Scalar,
            location: VariableLocation::Case,
            time_set: numbers.first().copied(),
            description: description.to_string(),
            source: VariableSource::Constants(values),
        })));
    }

    let (shape, location) = if key == "constant per case file" {
        (VariableShape::Scalar, VariableLocation::Case)
    } else {
        let (shape, location) = key.split_once(" per ")?;
        (parse_shape(shape.trim())?, parse_location(location.trim())?)
    };

    let (numbers, rest) = leading_numbers(&tokens, 2);
    if rest.len() != 2 || numbers.len() > 2 {
        return None;
    }

    if numbers.len() == 2 {
        let err = error::UnsupportedFormat::new("variable file set", value.into());
        return Some(Err(err.into()));
    }

    Some(Ok(Some(VariableEntry {
        shape,
        location,
        time_set: numbers.first().copied(),
        description: rest[0].to_string(),
        source: VariableSource::File(rest[1].to_string()),
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    TimeValues,
    FilenameNumbers,
}

struct PendingTimeSet {
    id: u32,
    description: Option<String>,
    steps: Option<usize>,
    start: Option<u32>,
    increment: Option<u32>,
    values: Vec<f64>,
    numbers: Vec<u32>,
    list: Option<ListKind>,
}

impl PendingTimeSet {
    /// `time set: <id> [description]`
    fn new(value: &str) -> Option<Self> {
        let mut tokens = value.split_ascii_whitespace();
        let id = tokens.next()?.parse().ok()?;
        let description: Vec<&str> = tokens.collect();

        Some(Self {
            id,
            description: (!description.is_empty()).then(|| description.join(" ")),
            steps: None,
            start: None,
            increment: None,
            values: Vec::new(),
            numbers: Vec::new(),
            list: None,
        })
    }

    /// the outer `Option` is `None` for a malformed line
    fn entry(&mut self, key: &str, value: &str) -> Option<Result<(), ParseError>> {
        self.list = None;

        match key {
            "number of steps" => self.steps = Some(value.parse().ok()?),
            "filename start number" => self.start = Some(value.parse().ok()?),
            "filename increment" => self.increment = Some(value.parse().ok()?),
            "time values" => {
                self.list = Some(ListKind::TimeValues);
                self.continue_list(value)?;
            }
            "filename numbers" => {
                self.list = Some(ListKind::FilenameNumbers);
                self.continue_list(value)?;
            }
            "time values file" | "filename numbers file" => {
                let err = error::UnsupportedFormat::new("time set entry", key.into());
                return Some(Err(err.into()));
            }
            _ => return None,
        }

        Some(Ok(()))
    }

    fn continue_list(&mut self, line: &str) -> Option<()> {
        for token in line.split_ascii_whitespace() {
            match self.list? {
                ListKind::TimeValues => self.values.push(token.parse().ok()?),
                ListKind::FilenameNumbers => self.numbers.push(token.parse().ok()?),
            }
        }
        Some(())
    }

    fn finish(self) -> Result<TimeSet, ParseError> {
        let malformed = |reason: String| error::MalformedTimeSet::new(self.id, reason);

        let steps = self
            .steps
            .ok_or_else(|| malformed("missing `number of steps`".into()))?;

        if self.values.len() != steps {
            let reason = format!(
                "declares {steps} steps but lists {} time values",
                self.values.len()
            );
            return Err(malformed(reason).into());
        }

        if self.values.windows(2).any(|w| w[1] < w[0]) {
            return Err(malformed("time values are not in ascending order".into()).into());
        }

        let numbers = if self.numbers.is_empty() {
            let start = self.start.unwrap_or(0);
            let increment = self.increment.unwrap_or(1);
            let overflow = || malformed("filename numbers do not fit in 32 bits".into());

            let steps = u32::try_from(steps).map_err(|_| overflow())?;
            (0..steps)
                .map(|i| i.checked_mul(increment).and_then(|offset| start.checked_add(offset)))
                .collect::<Option<Vec<u32>>>()
                .ok_or_else(overflow)?
        } else {
            self.numbers
        };

        let time_set = TimeSet::with_filename_numbers(self.id, self.values, numbers)
            .ok_or_else(|| malformed("filename numbers do not match the number of steps".into()))?;

        Ok(match self.description {
            Some(description) => time_set.with_description(description),
            None => time_set,
        })
    }
}

/// Wildcard filenames without an explicit time set use the first declared one.
fn assign_default_time_sets(case: &mut CaseFile) -> Result<(), ParseError> {
    let ids: Vec<u32> = case.time_sets.iter().map(|ts| ts.id).collect();

    let check = |filename: &str, time_set: &mut Option<u32>| -> Result<(), ParseError> {
        if time_set.is_none() && filename.contains('*') {
            *time_set = ids.first().copied();
        }

        match *time_set {
            Some(id) if !ids.contains(&id) => {
                Err(error::MissingTimeSet::new(filename.to_string(), id).into())
            }
            None if filename.contains('*') => {
                Err(error::MissingTimeSet::new(filename.to_string(), 1).into())
            }
            _ => Ok(()),
        }
    };

    check(&case.geometry.filename, &mut case.geometry.time_set)?;

    for variable in &mut case.variables {
        let filename = variable.filename().unwrap_or_default().to_string();
        check(&filename, &mut variable.time_set)?;
    }

    Ok(())
}
