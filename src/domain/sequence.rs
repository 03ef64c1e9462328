//! The flattened lesson order of a validated course.
//!
//! A [`Sequence`] walks units in declaration order and, within each unit,
//! topics in declaration order. It is lazy, borrows the course, and can be
//! iterated any number of times. A [`Bookmark`] records a position so a host
//! can resume iteration later, for example where a learner left off.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::domain::{TopicRef, Unit, ValidCourse};

/// The ordered lessons of a [`ValidCourse`].
#[derive(Debug, Clone, Copy)]
pub struct Sequence<'a> {
    units: &'a [Unit],
    len: usize,
}

impl<'a> Sequence<'a> {
    /// Creates the sequence for `course`.
    #[must_use]
    pub fn new(course: &'a ValidCourse) -> Self {
        Self {
            units: course.units(),
            len: course.topic_count(),
        }
    }

    /// Number of lessons: the sum of every unit's topic count.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence has no lessons.
    ///
    /// Never true for a validated course.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates every lesson from the start.
    #[must_use]
    pub const fn iter(&self) -> Lessons<'a> {
        self.resume(Bookmark::START)
    }

    /// Iterates the lessons from `bookmark` onwards.
    ///
    /// A bookmark at or past the end yields nothing.
    #[must_use]
    pub const fn resume(&self, bookmark: Bookmark) -> Lessons<'a> {
        let next = if bookmark.0 < self.len {
            bookmark.0
        } else {
            self.len
        };
        Lessons {
            units: self.units,
            next,
            end: self.len,
            unit: 0,
            offset: 0,
        }
    }

    /// The lesson at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Lesson<'a>> {
        if index >= self.len {
            return None;
        }
        locate(self.units, index)
    }

    /// The first lesson.
    #[must_use]
    pub fn first(&self) -> Option<Lesson<'a>> {
        self.iter().next()
    }

    /// The last lesson.
    #[must_use]
    pub fn last(&self) -> Option<Lesson<'a>> {
        self.iter().next_back()
    }
}

impl<'a> IntoIterator for &Sequence<'a> {
    type Item = Lesson<'a>;
    type IntoIter = Lessons<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for Sequence<'a> {
    type Item = Lesson<'a>;
    type IntoIter = Lessons<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One entry of a [`Sequence`]: a topic reference and where it was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson<'a> {
    /// Zero-based position in the flattened sequence.
    pub index: usize,
    /// Index of the declaring unit.
    pub unit_index: usize,
    /// Index of the topic within its unit.
    pub topic_index: usize,
    /// The declaring unit.
    pub unit: &'a Unit,
    /// The topic reference to hand to the content loader.
    pub topic: &'a TopicRef,
}

impl Lesson<'_> {
    /// A bookmark pointing at this lesson.
    #[must_use]
    pub const fn bookmark(&self) -> Bookmark {
        Bookmark(self.index)
    }

    /// A bookmark pointing at the lesson after this one.
    #[must_use]
    pub const fn next_bookmark(&self) -> Bookmark {
        Bookmark(self.index + 1)
    }
}

/// A position in a [`Sequence`].
///
/// A bookmark is a plain index; it never refers back to, or changes, the
/// course it was taken from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Bookmark(usize);

impl Bookmark {
    /// The start of every sequence.
    pub const START: Self = Self(0);

    /// A bookmark at the given zero-based lesson index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The zero-based lesson index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Iterator over the lessons of a [`Sequence`].
#[derive(Debug, Clone)]
pub struct Lessons<'a> {
    units: &'a [Unit],
    /// Flat index of the next lesson from the front.
    next: usize,
    /// Flat index one past the next lesson from the back.
    end: usize,
    /// Unit holding `next`, or an earlier one.
    unit: usize,
    /// Flat index of the first topic of `unit`.
    offset: usize,
}

impl<'a> Iterator for Lessons<'a> {
    type Item = Lesson<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        while self.next >= self.offset + self.units[self.unit].topics().len() {
            self.offset += self.units[self.unit].topics().len();
            self.unit += 1;
        }

        let unit = &self.units[self.unit];
        let topic_index = self.next - self.offset;
        let lesson = Lesson {
            index: self.next,
            unit_index: self.unit,
            topic_index,
            unit,
            topic: &unit.topics()[topic_index],
        };
        self.next += 1;
        Some(lesson)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Lessons<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        locate(self.units, self.end)
    }
}

impl ExactSizeIterator for Lessons<'_> {}

impl FusedIterator for Lessons<'_> {}

fn locate(units: &[Unit], index: usize) -> Option<Lesson<'_>> {
    let mut offset = 0;
    for (unit_index, unit) in units.iter().enumerate() {
        let count = unit.topics().len();
        if index < offset + count {
            let topic_index = index - offset;
            return Some(Lesson {
                index,
                unit_index,
                topic_index,
                unit,
                topic: &unit.topics()[topic_index],
            });
        }
        offset += count;
    }
    None
}
