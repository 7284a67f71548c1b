use std::fmt;

/// Element types that can appear in an Ensight Gold unstructured part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Point,
    Bar2,
    Bar3,
    Tria3,
    Tria6,
    Quad4,
    Quad8,
    Tetra4,
    Tetra10,
    Pyramid5,
    Pyramid13,
    Penta6,
    Penta15,
    Hexa8,
    Hexa20,
    /// polygons with a per-element node count
    NSided,
    /// polyhedra described face by face
    NFaced,
}

const ALL: [ElementType; 17] = [
    ElementType::Point,
    ElementType::Bar2,
    ElementType::Bar3,
    ElementType::Tria3,
    ElementType::Tria6,
    ElementType::Quad4,
    ElementType::Quad8,
    ElementType::Tetra4,
    ElementType::Tetra10,
    ElementType::Pyramid5,
    ElementType::Pyramid13,
    ElementType::Penta6,
    ElementType::Penta15,
    ElementType::Hexa8,
    ElementType::Hexa20,
    ElementType::NSided,
    ElementType::NFaced,
];

impl ElementType {
    /// parse the keyword that opens an element block, ignoring any trailing
    /// qualifiers such as `undef` or `partial`
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let word = keyword.split_ascii_whitespace().next()?;
        ALL.into_iter().find(|element| element.keyword() == word)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ElementType::Point => "point",
            ElementType::Bar2 => "bar2",
            ElementType::Bar3 => "bar3",
            ElementType::Tria3 => "tria3",
            ElementType::Tria6 => "tria6",
            ElementType::Quad4 => "quad4",
            ElementType::Quad8 => "quad8",
            ElementType::Tetra4 => "tetra4",
            ElementType::Tetra10 => "tetra10",
            ElementType::Pyramid5 => "pyramid5",
            ElementType::Pyramid13 => "pyramid13",
            ElementType::Penta6 => "penta6",
            ElementType::Penta15 => "penta15",
            ElementType::Hexa8 => "hexa8",
            ElementType::Hexa20 => "hexa20",
            ElementType::NSided => "nsided",
            ElementType::NFaced => "nfaced",
        }
    }

    /// Number of nodes of every element of this type, `None` for the
    /// variable sized `nsided` and `nfaced` types
    pub fn nodes_per_element(&self) -> Option<usize> {
        let nodes = match self {
            ElementType::Point => 1,
            ElementType::Bar2 => 2,
            ElementType::Bar3 => 3,
            ElementType::Tria3 => 3,
            ElementType::Tria6 => 6,
            ElementType::Quad4 => 4,
            ElementType::Quad8 => 8,
            ElementType::Tetra4 => 4,
            ElementType::Tetra10 => 10,
            ElementType::Pyramid5 => 5,
            ElementType::Pyramid13 => 13,
            ElementType::Penta6 => 6,
            ElementType::Penta15 => 15,
            ElementType::Hexa8 => 8,
            ElementType::Hexa20 => 20,
            ElementType::NSided | ElementType::NFaced => return None,
        };
        Some(nodes)
    }

    /// true for the element types that describe a surface polygon
    pub fn is_polygon(&self) -> bool {
        matches!(
            self,
            ElementType::Tria3
                | ElementType::Tria6
                | ElementType::Quad4
                | ElementType::Quad8
                | ElementType::NSided
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
