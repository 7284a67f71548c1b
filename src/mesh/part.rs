use crate::prelude::*;

use super::ElementType;

/// How node or element ids are handled by a geometry file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMode {
    #[default]
    Off,
    Given,
    Assign,
    Ignore,
}

impl IdMode {
    /// parse the value from a header line such as `node id given`
    pub fn from_header(line: &str) -> Option<Self> {
        let mode = match line.split_ascii_whitespace().last()? {
            "off" => IdMode::Off,
            "given" => IdMode::Given,
            "assign" => IdMode::Assign,
            "ignore" => IdMode::Ignore,
            _ => return None,
        };
        Some(mode)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            IdMode::Off => "off",
            IdMode::Given => "given",
            IdMode::Assign => "assign",
            IdMode::Ignore => "ignore",
        }
    }

    /// whether explicit ids are stored in the file for this mode
    pub fn is_stored(&self) -> bool {
        matches!(self, IdMode::Given | IdMode::Ignore)
    }
}

/// Face description of an `nfaced` block, kept so the block can be written back out
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Faces {
    /// number of faces of every element
    pub per_element: Vec<usize>,
    /// number of nodes of every face
    pub nodes_per_face: Vec<usize>,
    /// 0-based node indices of every face, concatenated
    pub nodes: Vec<usize>,
}

/// A run of elements of a single type inside a part
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBlock {
    element: ElementType,
    /// start of every element in `nodes`, followed by the end of the last one
    offsets: Vec<usize>,
    /// 0-based node indices
    nodes: Vec<usize>,
    faces: Option<Faces>,
}

impl ElementBlock {
    /// Construct a block of a fixed-size element type from flat 0-based connectivity.
    ///
    /// Returns `None` if `element` is variable sized or `nodes` is not a multiple of its
    /// node count.
    pub fn uniform(element: ElementType, nodes: Vec<usize>) -> Option<Self> {
        let per_element = element.nodes_per_element()?;
        if nodes.len() % per_element != 0 {
            return None;
        }

        let offsets = (0..=nodes.len() / per_element)
            .map(|i| i * per_element)
            .collect();

        Some(Self {
            element,
            offsets,
            nodes,
            faces: None,
        })
    }

    /// Construct an `nsided` block from the node count of every polygon.
    ///
    /// Returns `None` if the counts do not add up to the connectivity length.
    pub fn nsided(counts: &[usize], nodes: Vec<usize>) -> Option<Self> {
        let offsets = offsets_from_counts(counts);
        if offsets.last().copied() != Some(nodes.len()) {
            return None;
        }

        Some(Self {
            element: ElementType::NSided,
            offsets,
            nodes,
            faces: None,
        })
    }

    /// Construct an `nfaced` block. The nodes of each element are the distinct
    /// nodes of its faces in order of first appearance.
    pub fn nfaced(faces: Faces) -> Option<Self> {
        let face_offsets = offsets_from_counts(&faces.nodes_per_face);
        if face_offsets.last().copied() != Some(faces.nodes.len())
            || faces.per_element.iter().sum::<usize>() != faces.nodes_per_face.len()
        {
            return None;
        }

        let mut offsets = vec![0];
        let mut nodes = Vec::new();
        let mut face = 0;

        for face_count in &faces.per_element {
            let start = nodes.len();
            for _ in 0..*face_count {
                for node in &faces.nodes[face_offsets[face]..face_offsets[face + 1]] {
                    if !nodes[start..].contains(node) {
                        nodes.push(*node);
                    }
                }
                face += 1;
            }
            offsets.push(nodes.len());
        }

        Some(Self {
            element: ElementType::NFaced,
            offsets,
            nodes,
            faces: Some(faces),
        })
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    /// number of elements in the block
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 0-based node indices of element `index`
    pub fn cell(&self, index: usize) -> &[usize] {
        &self.nodes[self.offsets[index]..self.offsets[index + 1]]
    }

    /// all 0-based node indices of the block, concatenated
    pub fn connectivity(&self) -> &[usize] {
        &self.nodes
    }

    /// node count of every element
    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.windows(2).map(|w| w[1] - w[0])
    }

    pub fn faces(&self) -> Option<&Faces> {
        self.faces.as_ref()
    }
}

fn offsets_from_counts(counts: &[usize]) -> Vec<usize> {
    std::iter::once(0)
        .chain(counts.iter().scan(0, |total, count| {
            *total += count;
            Some(*total)
        }))
        .collect()
}

/// A single cell of a part, borrowed from its element block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell<'a> {
    pub element: ElementType,
    pub nodes: &'a [usize],
}

/// An unstructured Ensight part: node coordinates plus element blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub number: i32,
    pub description: String,
    /// node coordinates with shape `(nodes, 3)`
    pub coordinates: Array2<f64>,
    pub blocks: Vec<ElementBlock>,
}

impl Part {
    pub fn new(number: i32, description: impl Into<String>, coordinates: Array2<f64>) -> Self {
        Self {
            number,
            description: description.into(),
            coordinates,
            blocks: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: ElementBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn num_nodes(&self) -> usize {
        self.coordinates.nrows()
    }

    /// total number of cells over all element blocks
    pub fn num_cells(&self) -> usize {
        self.blocks.iter().map(ElementBlock::len).sum()
    }

    /// coordinates of node `index`, `None` if the part has no such node or fewer than
    /// three coordinate columns
    pub fn point(&self, index: usize) -> Option<[f64; 3]> {
        if index >= self.num_nodes() || self.coordinates.ncols() < 3 {
            return None;
        }
        let row = self.coordinates.row(index);
        Some([row[0], row[1], row[2]])
    }

    /// every cell of the part, block by block in file order
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        self.blocks.iter().flat_map(|block| {
            (0..block.len()).map(move |index| Cell {
                element: block.element(),
                nodes: block.cell(index),
            })
        })
    }
}

/// Everything stored in an Ensight Gold geometry file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub description: [String; 2],
    pub node_ids: IdMode,
    pub element_ids: IdMode,
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub extents: Option<[f64; 6]>,
    pub parts: Vec<Part>,
}

impl Geometry {
    /// the first part in the file, which is treated as the primary geometry block
    pub fn primary_part(&self) -> Option<&Part> {
        self.parts.first()
    }

    pub fn part(&self, number: i32) -> Option<&Part> {
        self.parts.iter().find(|part| part.number == number)
    }
}
