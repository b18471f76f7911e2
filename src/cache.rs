use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::texture::{Filter, Format, Texture};
use crate::Error;

/// Turns the bytes of an image file into pixels.
pub trait Decode {
    fn decode<R: BufRead + Seek>(&self, reader: R) -> Result<image::DynamicImage, Error>;
}

/// Decodes any format compiled into `image`, guessing it from the file's
/// leading bytes.
///
/// Read failures surface as [`Error::Io`] whether they happen while sniffing
/// or while decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sniff;

impl Decode for Sniff {
    fn decode<R: BufRead + Seek>(&self, reader: R) -> Result<image::DynamicImage, Error> {
        image::ImageReader::new(reader)
            .with_guessed_format()?
            .decode()
            .map_err(|err| match err {
                image::ImageError::IoError(err) => Error::Io(err),
                err => Error::Decode(err),
            })
    }
}

/// Serializes loads of a single path.
type Slot = Arc<Mutex<()>>;

/// Caches [`Texture`]s by the path they were loaded from.
///
/// Paths are compared as plain strings, so `a.png` and `./a.png` are loaded
/// separately. Entries are never evicted.
pub struct TextureCache<D = Sniff> {
    decoder: D,
    loaded: Mutex<IndexMap<String, Arc<Texture>>>,
    // Only paths with a load in flight have a slot.
    loading: Mutex<HashMap<String, Slot>>,
}

impl TextureCache {
    /// Creates an empty cache that decodes with [`Sniff`].
    pub fn new() -> Self {
        Self::with_decoder(Sniff)
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> TextureCache<D>
where
    D: Decode,
{
    /// Creates an empty cache that decodes with `decoder`.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            loaded: Mutex::new(IndexMap::new()),
            loading: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the texture for `path`, loading it on first use.
    ///
    /// A freshly loaded texture covers the whole image and samples with
    /// trilinear minification, linear magnification and DXT1 storage. Every
    /// later call with the same path returns the same [`Arc`] without touching
    /// the filesystem.
    ///
    /// Open and decode failures are returned as-is and leave nothing behind,
    /// so the next call tries again.
    pub fn get_or_load(&self, path: &str) -> Result<Arc<Texture>, Error> {
        if let Some(texture) = self.get(path) {
            log::trace!("texture cache hit: {path}");
            return Ok(texture);
        }

        let slot = self
            .loading
            .lock()
            .entry(path.to_string())
            .or_default()
            .clone();
        let result = self.load_once(path, &slot);
        self.release(path, slot);
        result
    }

    fn load_once(&self, path: &str, slot: &Slot) -> Result<Arc<Texture>, Error> {
        // Held across the load so concurrent misses on one path decode once.
        let _guard = slot.lock();
        if let Some(texture) = self.get(path) {
            return Ok(texture);
        }

        let texture = Arc::new(self.load(path)?);
        log::debug!(
            "loaded texture {path} ({}x{})",
            texture.bounds.size.x,
            texture.bounds.size.y
        );
        self.loaded
            .lock()
            .insert(path.to_string(), texture.clone());
        Ok(texture)
    }

    fn load(&self, path: &str) -> Result<Texture, Error> {
        let file = File::open(path)?;
        let img = self.decoder.decode(BufReader::new(file))?;

        let mut texture = Texture::new(img);
        texture.min_filter = Filter::LinearMipmapLinear;
        texture.mag_filter = Filter::Linear;
        texture.format = Format::Dxt1;
        Ok(texture)
    }
}

impl<D> TextureCache<D> {
    /// Drops the slot for `path` once no other caller is waiting on it.
    fn release(&self, path: &str, slot: Slot) {
        let mut loading = self.loading.lock();
        // One reference is ours, one is the map's.
        if Arc::strong_count(&slot) == 2
            && loading.get(path).is_some_and(|s| Arc::ptr_eq(s, &slot))
        {
            loading.remove(path);
        }
        drop(slot);
    }

    /// Returns the texture for `path` if it has already been loaded.
    ///
    /// Never waits for a load in flight.
    pub fn get(&self, path: &str) -> Option<Arc<Texture>> {
        self.loaded.lock().get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.loaded.lock().contains_key(path)
    }

    /// Number of loaded textures.
    pub fn len(&self) -> usize {
        self.loaded.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths of all loaded textures, in the order their loads completed.
    pub fn paths(&self) -> Vec<String> {
        self.loaded.lock().keys().cloned().collect()
    }
}
