use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::model::{FrameSample, VideoId};

/// LRU cache of geocoded frame sequences keyed by video.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use engine::FrameSample;
/// use engine::cache::FrameCache;
///
/// let mut cache = FrameCache::new(4);
/// cache.insert(7, Arc::from(vec![FrameSample { latitude: 28.6, longitude: 77.2 }]));
///
/// assert_eq!(cache.get(7).map(|frames| frames.len()), Some(1));
/// assert!(cache.get(8).is_none());
/// ```
#[derive(Debug)]
pub struct FrameCache {
    capacity: usize,
    entries: HashMap<VideoId, Arc<[FrameSample]>>,
    lru_order: VecDeque<VideoId>,
}

impl FrameCache {
    /// Creates a frame cache.
    ///
    /// `capacity` must be positive.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame cache capacity must be positive");
        Self {
            capacity,
            entries: HashMap::new(),
            lru_order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru_order.clear();
    }

    /// Returns cached frames and marks them as recently used.
    pub fn get(&mut self, video_id: VideoId) -> Option<Arc<[FrameSample]>> {
        let frames = Arc::clone(self.entries.get(&video_id)?);
        self.touch(video_id);
        Some(frames)
    }

    pub fn insert(&mut self, video_id: VideoId, frames: Arc<[FrameSample]>) {
        self.entries.insert(video_id, frames);
        self.touch(video_id);
        self.evict_if_needed();
    }

    fn touch(&mut self, video_id: VideoId) {
        if let Some(index) = self.lru_order.iter().position(|existing| *existing == video_id) {
            let _ = self.lru_order.remove(index);
        }
        self.lru_order.push_back(video_id);
    }

    fn evict_if_needed(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.lru_order.pop_front() else {
                break;
            };
            let _ = self.entries.remove(&oldest);
        }
    }
}
