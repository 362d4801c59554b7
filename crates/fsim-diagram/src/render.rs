use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use fsim_core::errors::{ErrorInfo, SimError};
use fsim_core::{Complex64, Dir};

use crate::diagram::Diagram;
use crate::elements::{GLine, Vertex, WLine};

fn complex(value: Complex64) -> String {
    format!("({},{})", value.re, value.im)
}

impl Diagram {
    /// One-line rendering of a propagator.
    pub fn pretty_g(&self, g: &GLine) -> String {
        format!(
            "{} ({}) >>===Name:{},K:{},Weight:{}===>>{} ({});",
            g.vertex[Dir::In.index()],
            self.g_spin(g, Dir::In),
            g.name,
            g.k,
            complex(g.weight),
            g.vertex[Dir::Out.index()],
            self.g_spin(g, Dir::Out),
        )
    }

    /// One-line rendering of an interaction line.
    pub fn pretty_w(&self, w: &WLine) -> String {
        format!(
            "{} ({},{}) ~~~Name:{},K:{},Weight:{}~~~{} ({},{});",
            w.vertex[Dir::In.index()],
            self.w_spin(w, Dir::In, Dir::In),
            self.w_spin(w, Dir::In, Dir::Out),
            w.name,
            w.k,
            complex(w.weight),
            w.vertex[Dir::Out.index()],
            self.w_spin(w, Dir::Out, Dir::In),
            self.w_spin(w, Dir::Out, Dir::Out),
        )
    }

    /// One-line rendering of a vertex.
    pub fn pretty_vertex(&self, v: &Vertex) -> String {
        format!(
            "{}>===Name:{},r:{},tau:{},spin:({},{})===>{} ~~~~{}",
            v.g(Dir::In),
            v.name,
            v.site,
            v.tau,
            v.spin(Dir::In),
            v.spin(Dir::Out),
            v.g(Dir::Out),
            v.w,
        )
    }

    /// Full rendering: a header line followed by one line per entity.
    pub fn pretty_string(&self) -> String {
        let mut out = String::new();
        let worm = if self.worm.exist {
            format!("Ira:{},Masha:{}", self.worm.ira, self.worm.masha)
        } else {
            "none".to_string()
        };
        let _ = writeln!(
            out,
            "Order:{},Phase:{},Weight:{},Worm:{}",
            self.order,
            complex(self.phase),
            complex(self.weight),
            worm
        );
        for v in self.ver.iter() {
            let _ = writeln!(out, "{}", self.pretty_vertex(v));
        }
        for g in self.g.iter() {
            let _ = writeln!(out, "{}", self.pretty_g(g));
        }
        for w in self.w.iter() {
            let _ = writeln!(out, "{}", self.pretty_w(w));
        }
        out
    }

    /// Graphviz rendering used for periodic visual inspection.
    pub fn to_graphviz(&self) -> String {
        let mut out = String::from("digraph Diagram {\n    node [shape=circle];\n");
        for v in self.ver.iter() {
            let color = if self.is_worm(v) { "red" } else { "black" };
            let _ = writeln!(
                out,
                "    v{} [label=\"{}\\n{}\", color={}];",
                v.name, v.name, v.tau, color
            );
        }
        for g in self.g.iter() {
            let _ = writeln!(
                out,
                "    v{} -> v{} [label=\"G{}\"];",
                g.vertex[Dir::In.index()],
                g.vertex[Dir::Out.index()],
                g.name
            );
        }
        for w in self.w.iter() {
            let _ = writeln!(
                out,
                "    v{} -> v{} [label=\"W{}\", style=dashed, dir=none, color=blue];",
                w.vertex[Dir::In.index()],
                w.vertex[Dir::Out.index()],
                w.name
            );
        }
        out.push_str("}\n");
        out
    }

    /// Writes the Graphviz rendering to disk.
    pub fn write_graphviz(&self, path: &Path) -> Result<(), SimError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SimError::Serde(
                    ErrorInfo::new("graphviz-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        fs::write(path, self.to_graphviz()).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("graphviz-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
