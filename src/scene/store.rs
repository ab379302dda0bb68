use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::scene::model::{ImageLayer, LayerId, TextLayer};

/// Which layer the editing controls currently target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerRef {
    Image(LayerId),
    Text(LayerId),
}

impl LayerRef {
    pub fn id(self) -> LayerId {
        match self {
            Self::Image(id) | Self::Text(id) => id,
        }
    }
}

/// Ordered image and text layers plus the active selection.
///
/// Images always paint beneath text; within each list, insertion order is paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerStore {
    images: Vec<ImageLayer>,
    text_layers: Vec<TextLayer>,
    selection: Option<LayerRef>,
    next_id: u64,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded layers, assigning fresh ids.
    pub fn from_layers(images: Vec<ImageLayer>, text_layers: Vec<TextLayer>) -> Self {
        let mut store = Self::new();
        for img in images {
            store.push_image(img);
        }
        for text in text_layers {
            store.push_text(text);
        }
        store.selection = None;
        store
    }

    fn alloc_id(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id)
    }

    fn push_image(&mut self, mut layer: ImageLayer) -> LayerId {
        let id = self.alloc_id();
        layer.id = id;
        self.images.push(layer);
        id
    }

    fn push_text(&mut self, mut layer: TextLayer) -> LayerId {
        let id = self.alloc_id();
        layer.id = id;
        self.text_layers.push(layer);
        id
    }

    /// Append an image layer and make it active.
    pub fn add_image(&mut self, layer: ImageLayer) -> LayerId {
        let id = self.push_image(layer);
        self.selection = Some(LayerRef::Image(id));
        tracing::debug!(id = id.0, "image layer added");
        id
    }

    /// Append a text layer and make it active.
    pub fn add_text(&mut self, layer: TextLayer) -> LayerId {
        let id = self.push_text(layer);
        self.selection = Some(LayerRef::Text(id));
        tracing::debug!(id = id.0, "text layer added");
        id
    }

    pub fn images(&self) -> &[ImageLayer] {
        &self.images
    }

    pub fn text_layers(&self) -> &[TextLayer] {
        &self.text_layers
    }

    pub fn selection(&self) -> Option<LayerRef> {
        self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.text_layers.is_empty()
    }

    /// Make `id` the active layer, whichever list it lives in.
    pub fn select(&mut self, id: LayerId) -> WaveclipResult<LayerRef> {
        let found = if self.images.iter().any(|l| l.id == id) {
            LayerRef::Image(id)
        } else if self.text_layers.iter().any(|l| l.id == id) {
            LayerRef::Text(id)
        } else {
            return Err(WaveclipError::validation(format!(
                "no layer with id {}",
                id.0
            )));
        };
        self.selection = Some(found);
        Ok(found)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn active_image(&self) -> Option<&ImageLayer> {
        match self.selection? {
            LayerRef::Image(id) => self.images.iter().find(|l| l.id == id),
            LayerRef::Text(_) => None,
        }
    }

    pub fn active_text(&self) -> Option<&TextLayer> {
        match self.selection? {
            LayerRef::Text(id) => self.text_layers.iter().find(|l| l.id == id),
            LayerRef::Image(_) => None,
        }
    }

    /// Mutate the active layer if it is an image. Returns whether anything was updated.
    pub fn update_active_image(&mut self, f: impl FnOnce(&mut ImageLayer)) -> bool {
        let Some(LayerRef::Image(id)) = self.selection else {
            return false;
        };
        match self.images.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                f(layer);
                layer.id = id;
                true
            }
            None => false,
        }
    }

    /// Mutate the active layer if it is text. Returns whether anything was updated.
    pub fn update_active_text(&mut self, f: impl FnOnce(&mut TextLayer)) -> bool {
        let Some(LayerRef::Text(id)) = self.selection else {
            return false;
        };
        match self.text_layers.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                f(layer);
                layer.id = id;
                true
            }
            None => false,
        }
    }

    /// Delete a layer by id. Clears the selection if it pointed at the removed layer.
    pub fn remove(&mut self, id: LayerId) -> bool {
        let before = self.images.len() + self.text_layers.len();
        self.images.retain(|l| l.id != id);
        self.text_layers.retain(|l| l.id != id);
        let removed = self.images.len() + self.text_layers.len() != before;
        if removed && self.selection.map(LayerRef::id) == Some(id) {
            self.selection = None;
        }
        removed
    }

    /// Delete the active layer, if any.
    pub fn remove_active(&mut self) -> bool {
        match self.selection {
            Some(sel) => self.remove(sel.id()),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/store.rs"]
mod tests;
