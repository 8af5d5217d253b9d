// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of a display tree.
//!
//! [`snapshot`] renders every root of a [`DisplayList`] as a nested JSON
//! value for inspection in tests, bug reports or external viewers. Values
//! reflect the last [`update_transforms`](DisplayList::update_transforms).

use std::io::{self, Write};

use serde_json::{Value, json};

use tableau_core::display::{DisplayList, NodeId, NodeKind};
use tableau_core::rect::Rectangle;

/// Returns the whole display tree as a JSON object:
///
/// ```json
/// { "stage": 0, "pass": 3, "roots": [ { "id": 0, ... "children": [] } ] }
/// ```
#[must_use]
pub fn snapshot(list: &DisplayList) -> Value {
    let roots: Vec<Value> = list.roots().into_iter().map(|id| node(list, id)).collect();
    json!({
        "stage": list.stage().map(NodeId::index),
        "pass": list.pass_index(),
        "roots": roots,
    })
}

/// Writes [`snapshot`] as pretty-printed JSON.
pub fn write_snapshot(list: &DisplayList, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &snapshot(list))?;
    Ok(())
}

fn node(list: &DisplayList, id: NodeId) -> Value {
    let children: Vec<Value> = list.children(id).map(|child| node(list, child)).collect();
    let world = list.world_transform(id);
    let mut value = json!({
        "id": id.index(),
        "generation": id.generation(),
        "kind": match list.kind(id) {
            NodeKind::Container => "container",
            NodeKind::Shape => "shape",
        },
        "world_transform": world.to_array(),
        "alpha": list.effective_alpha(id),
        "hidden": list.effective_hidden(id),
        "on_stage": list.is_on_stage(id),
        "bounds": rect(list.world_bounds(id)),
        "children": children,
    });
    if list.kind(id) == NodeKind::Shape {
        let graphics = list.graphics(id);
        let offset = graphics.offset();
        value["offset"] = json!([offset.x, offset.y]);
        value["commands"] = json!(graphics.render_node().commands().len());
        value["graphics_offset_matrix"] = json!(list.graphics_offset_matrix(id).to_array());
    }
    value
}

fn rect(r: Rectangle) -> Value {
    json!([r.x, r.y, r.width, r.height])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::matrix::Matrix;

    #[test]
    fn snapshot_has_tree_shape() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let shape = list.create_shape();
        list.add_child(stage, shape);
        list.set_stage(Some(stage));
        list.set_transform(stage, Matrix::from_translation(10.0, 0.0));
        let g = list.graphics_mut(shape);
        g.begin_fill(0, 1.0);
        g.draw_rect(0.0, 0.0, 4.0, 4.0);
        g.end_fill();
        g.set_offset(1.0, 2.0);
        let _ = list.update_transforms();

        let value = snapshot(&list);
        assert_eq!(value["stage"], 0);
        assert_eq!(value["pass"], 1);
        let root = &value["roots"][0];
        assert_eq!(root["kind"], "container");
        assert_eq!(root["on_stage"], true);
        let child = &root["children"][0];
        assert_eq!(child["kind"], "shape");
        assert_eq!(child["offset"], json!([1.0, 2.0]));
        assert_eq!(child["commands"], 1);
        assert_eq!(
            child["graphics_offset_matrix"],
            json!([1.0, 0.0, 0.0, 1.0, 11.0, 2.0])
        );
        assert_eq!(child["bounds"], json!([11.0, 2.0, 4.0, 4.0]));
    }

    #[test]
    fn write_snapshot_produces_valid_json() {
        let mut list = DisplayList::new();
        let _ = list.create_container();
        let _ = list.update_transforms();

        let mut out = Vec::new();
        write_snapshot(&list, &mut out).unwrap();
        let parsed: Value = serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(parsed["stage"], Value::Null);
        assert_eq!(parsed["roots"].as_array().map(Vec::len), Some(1));
    }
}
