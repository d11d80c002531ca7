use tracing::info;

use crate::error::{LibraryError, LibraryResult};
use crate::models::Student;

use super::matches_ignore_case;
use super::shelf::{GrowthPolicy, Shelf};

/// Registered students in registration order.
#[derive(Debug, Clone)]
pub struct Roster {
    students: Shelf<Student>,
    default_limit: usize,
}

impl Roster {
    pub fn new(capacity: usize, growth: GrowthPolicy, default_limit: usize) -> LibraryResult<Self> {
        if default_limit == 0 {
            return Err(LibraryError::invalid("borrowing limit must be at least 1"));
        }
        Ok(Self {
            students: Shelf::with_capacity(capacity, growth)?,
            default_limit,
        })
    }

    /// Register a student with an empty loan list and the default limit.
    /// Ids and names are not required to be unique.
    pub fn add(&mut self, id: u32, name: &str) -> LibraryResult<&Student> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::invalid("student name is required"));
        }

        let index = self.students.push(Student {
            id,
            name: name.to_string(),
            borrowed: Vec::new(),
            max_books: self.default_limit,
        })?;
        let student = &self.students.as_slice()[index];
        info!(id, name = %student.name, count = self.students.len(), "student added");
        Ok(student)
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.students
            .position(|student| matches_ignore_case(&student.name, name))
    }

    /// First student whose name contains `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Student> {
        self.position_by_name(name)
            .and_then(|index| self.students.get(index))
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Student> {
        let index = self.position_by_name(name)?;
        self.students.get_mut(index)
    }

    /// Titles the matching student currently holds, oldest loan first.
    pub fn list_borrowed(&self, name: &str) -> LibraryResult<&[String]> {
        self.find_by_name(name)
            .map(|student| student.borrowed.as_slice())
            .ok_or_else(|| LibraryError::StudentNotFound(name.to_string()))
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn get(&self, index: usize) -> Option<&Student> {
        self.students.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Student> {
        self.students.iter()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.students.capacity()
    }
}
