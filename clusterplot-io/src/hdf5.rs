//! HDF5 cluster tables.
//!
//! A table is a group inside a namespace group. Every field is stored as a
//! flattened `f32` value dataset plus a `u64` start-offset index with one
//! entry per event:
//!
//! ```text
//! /ana                            namespace group
//! /ana/ClusterTree                table group, attribute `entries` (u64)
//! /ana/ClusterTree/Y              f32[total]
//! /ana/ClusterTree/Y_index        u64[rows]
//! /ana/ClusterTree/Y_present      u8[rows]    optional, 0 = absent
//! ```
//!
//! An index shorter than the table leaves the field absent for the trailing
//! events; a field with no datasets is absent everywhere. Without a
//! `_present` mask every indexed row is present.

use crate::table::ClusterTable;
use crate::{Error, Result};
use clusterplot_core::{Event, Field};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::{s, ArrayView1};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ENTRIES_ATTR: &str = "entries";
const INDEX_SUFFIX: &str = "_index";
const PRESENT_SUFFIX: &str = "_present";

/// Where a table lives inside a file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableLocation {
    /// Namespace group.
    pub directory: String,
    /// Table group inside the namespace.
    pub table: String,
}

impl Default for TableLocation {
    fn default() -> Self {
        Self::new("ana", "ClusterTree")
    }
}

impl TableLocation {
    /// Creates a location.
    pub fn new(directory: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.directory, self.table)
    }
}

/// An open input file.
pub struct ClusterFile {
    file: File,
    path: PathBuf,
}

impl ClusterFile {
    /// Opens a file read-only.
    ///
    /// # Errors
    /// Returns [`Error::Open`] if the file is missing or not readable as HDF5.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a table.
    ///
    /// # Errors
    /// Returns [`Error::DirectoryNotFound`] if the namespace group is
    /// missing, [`Error::TableNotFound`] if the table is missing, and
    /// [`Error::InvalidFormat`] if its index datasets are inconsistent.
    pub fn table(&self, location: &TableLocation) -> Result<Hdf5ClusterTable> {
        let directory = self
            .file
            .group(&location.directory)
            .map_err(|_| Error::DirectoryNotFound(location.directory.clone()))?;
        let Ok(group) = directory.group(&location.table) else {
            let mut available = directory.member_names()?;
            available.sort();
            return Err(Error::TableNotFound {
                directory: location.directory.clone(),
                table: location.table.clone(),
                available,
            });
        };
        let table = Hdf5ClusterTable::from_group(self.file.clone(), &group)?;
        for name in group.member_names()? {
            let stem = name
                .strip_suffix(INDEX_SUFFIX)
                .or_else(|| name.strip_suffix(PRESENT_SUFFIX))
                .unwrap_or(name.as_str());
            if Field::from_name(stem).is_none() {
                log::debug!("{location}: ignoring member {name}");
            }
        }
        log::info!(
            "opened {location} in {}: {} events, fields [{}]",
            self.path.display(),
            table.row_count(),
            table
                .fields()
                .iter()
                .map(|field| field.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(table)
    }
}

/// One stored field: value dataset, per-row start offsets and presence.
struct FieldColumn {
    values: Dataset,
    value_count: usize,
    offsets: Vec<usize>,
    present: Option<Vec<bool>>,
}

impl FieldColumn {
    fn load(group: &Group, field: Field) -> Result<Option<Self>> {
        let index_name = format!("{}{INDEX_SUFFIX}", field.name());
        let values = group.dataset(field.name()).ok();
        let index = read_dataset_vec_opt::<u64>(group, &index_name)?;
        let (values, index) = match (values, index) {
            (Some(values), Some(index)) => (values, index),
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(Error::InvalidFormat(format!(
                    "field {field} has values but no {index_name}"
                )))
            }
            (None, Some(_)) => {
                return Err(Error::InvalidFormat(format!(
                    "field {field} has {index_name} but no values"
                )))
            }
        };

        let value_count = values.size();
        let mut offsets = Vec::with_capacity(index.len());
        let mut previous = 0usize;
        for (row, &offset) in index.iter().enumerate() {
            let offset = usize::try_from(offset)
                .ok()
                .filter(|&offset| offset >= previous && offset <= value_count)
                .ok_or_else(|| {
                    Error::InvalidFormat(format!(
                        "{index_name}[{row}] = {offset} is out of order or beyond {value_count} values"
                    ))
                })?;
            offsets.push(offset);
            previous = offset;
        }

        let present_name = format!("{}{PRESENT_SUFFIX}", field.name());
        let present = match read_dataset_vec_opt::<u8>(group, &present_name)? {
            Some(mask) if mask.len() != offsets.len() => {
                return Err(Error::InvalidFormat(format!(
                    "{present_name} has {} rows, {index_name} has {}",
                    mask.len(),
                    offsets.len()
                )))
            }
            Some(mask) => Some(mask.into_iter().map(|flag| flag != 0).collect()),
            None => None,
        };

        Ok(Some(Self {
            values,
            value_count,
            offsets,
            present,
        }))
    }

    fn rows(&self) -> usize {
        self.offsets.len()
    }

    fn is_present(&self, row: usize) -> bool {
        self.present
            .as_ref()
            .map_or(row < self.rows(), |mask| mask.get(row).copied().unwrap_or(false))
    }

    fn any_present(&self) -> bool {
        self.present
            .as_ref()
            .map_or(self.rows() > 0, |mask| mask.iter().any(|&flag| flag))
    }

    fn row_end(&self, row: usize) -> usize {
        self.offsets.get(row + 1).copied().unwrap_or(self.value_count)
    }

    /// Reads the rows of `range` that this column covers with one slice read.
    ///
    /// Rows marked absent come back as `None`.
    fn read(&self, range: &Range<usize>) -> Result<Vec<Option<Vec<f32>>>> {
        let last = range.end.min(self.rows());
        if range.start >= last {
            return Ok(Vec::new());
        }
        let start = self.offsets[range.start];
        let end = self.row_end(last - 1);
        let values: Vec<f32> = if start == end {
            Vec::new()
        } else {
            self.values.read_slice_1d::<f32, _>(s![start..end])?.to_vec()
        };
        Ok((range.start..last)
            .map(|row| {
                self.is_present(row).then(|| {
                    values[self.offsets[row] - start..self.row_end(row) - start].to_vec()
                })
            })
            .collect())
    }
}

/// A cluster table backed by an HDF5 group.
pub struct Hdf5ClusterTable {
    _file: File,
    rows: usize,
    columns: BTreeMap<Field, FieldColumn>,
}

impl Hdf5ClusterTable {
    fn from_group(file: File, group: &Group) -> Result<Self> {
        let mut columns = BTreeMap::new();
        for field in Field::ALL {
            if let Some(column) = FieldColumn::load(group, field)? {
                columns.insert(field, column);
            }
        }
        let longest = columns.values().map(FieldColumn::rows).max().unwrap_or(0);
        let rows = match read_attr_opt::<u64>(group, ENTRIES_ATTR)? {
            Some(entries) => usize::try_from(entries).map_err(|_| {
                Error::InvalidFormat(format!("entries attribute {entries} exceeds usize"))
            })?,
            None => longest,
        };
        Ok(Self {
            _file: file,
            rows,
            columns,
        })
    }
}

impl ClusterTable for Hdf5ClusterTable {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn has_field(&self, field: Field) -> bool {
        self.columns.get(&field).is_some_and(FieldColumn::any_present)
    }

    fn read_rows(&self, rows: Range<usize>) -> Result<Vec<Event>> {
        if rows.start > rows.end || rows.end > self.rows {
            return Err(Error::InvalidFormat(format!(
                "rows {}..{} out of range for {} events",
                rows.start, rows.end, self.rows
            )));
        }
        let mut events = vec![Event::new(); rows.len()];
        for (&field, column) in &self.columns {
            for (event, values) in events.iter_mut().zip(column.read(&rows)?) {
                event.set_column(field, values);
            }
        }
        Ok(events)
    }
}

/// Dataset layout options for [`ClusterTreeWriter`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteOptions {
    /// Chunk length of every dataset.
    pub chunk_values: usize,
    /// Deflate level, `None` for no compression.
    pub compression: Option<u8>,
    /// Apply the shuffle filter.
    pub shuffle: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            chunk_values: 16_384,
            compression: Some(1),
            shuffle: true,
        }
    }
}

struct ColumnWriter {
    values: Dataset,
    index: Dataset,
    present: Dataset,
    value_count: usize,
    rows: usize,
}

impl ColumnWriter {
    fn create(group: &Group, field: Field, options: &WriteOptions) -> Result<Self> {
        let values = create_extendable_dataset::<f32>(
            group,
            field.name(),
            options.chunk_values,
            options.compression,
            options.shuffle,
        )?;
        let index = create_extendable_dataset::<u64>(
            group,
            &format!("{}{INDEX_SUFFIX}", field.name()),
            options.chunk_values,
            options.compression,
            options.shuffle,
        )?;
        let present = create_extendable_dataset::<u8>(
            group,
            &format!("{}{PRESENT_SUFFIX}", field.name()),
            options.chunk_values,
            options.compression,
            options.shuffle,
        )?;
        Ok(Self {
            values,
            index,
            present,
            value_count: 0,
            rows: 0,
        })
    }

    /// Adds absent rows until the column holds `rows` rows.
    fn pad_to(&mut self, rows: usize) -> Result<()> {
        if rows > self.rows {
            let gap = rows - self.rows;
            append_slice(&self.index, self.rows, &vec![self.value_count as u64; gap])?;
            append_slice(&self.present, self.rows, &vec![0u8; gap])?;
            self.rows = rows;
        }
        Ok(())
    }

    fn append(&mut self, values: &[f32]) -> Result<()> {
        append_slice(&self.index, self.rows, &[self.value_count as u64])?;
        append_slice(&self.present, self.rows, &[1u8])?;
        append_slice(&self.values, self.value_count, values)?;
        self.rows += 1;
        self.value_count += values.len();
        Ok(())
    }
}

/// Streaming writer for cluster tables.
///
/// Columns are created when a field first appears. A field missing from an
/// event that is followed by events carrying it is flagged in the column's
/// `_present` mask; trailing absence shortens the index.
pub struct ClusterTreeWriter {
    _file: File,
    group: Group,
    options: WriteOptions,
    columns: BTreeMap<Field, ColumnWriter>,
    rows: usize,
}

impl ClusterTreeWriter {
    /// Creates a new file holding an empty table.
    ///
    /// # Errors
    /// Returns an error if the file or groups cannot be created.
    pub fn create<P: AsRef<Path>>(
        path: P,
        location: &TableLocation,
        options: WriteOptions,
    ) -> Result<Self> {
        let file = File::create(path)?;
        set_attr_str_file(&file, "clusterplot_format_version", "0.1")?;
        let directory = file.create_group(&location.directory)?;
        let group = directory.create_group(&location.table)?;
        Ok(Self {
            _file: file,
            group,
            options,
            columns: BTreeMap::new(),
            rows: 0,
        })
    }

    /// Appends one event.
    ///
    /// # Errors
    /// Returns an error if a dataset cannot be created or extended.
    pub fn append_event(&mut self, event: &Event) -> Result<()> {
        for field in Field::ALL {
            let Some(values) = event.column(field) else {
                continue;
            };
            let column = match self.columns.entry(field) {
                std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(ColumnWriter::create(&self.group, field, &self.options)?)
                }
            };
            column.pad_to(self.rows)?;
            column.append(values)?;
        }
        self.rows += 1;
        Ok(())
    }

    /// Number of events written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Records the event count and closes the file.
    ///
    /// # Errors
    /// Returns an error if the attribute cannot be written.
    pub fn finish(self) -> Result<usize> {
        self.group
            .new_attr::<u64>()
            .create(ENTRIES_ATTR)?
            .write_scalar(&(self.rows as u64))?;
        log::debug!(
            "wrote {} events with {} fields",
            self.rows,
            self.columns.len()
        );
        Ok(self.rows)
    }
}

/// Writes every event of `events` to a new file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_cluster_tree<'a, P, I>(
    path: P,
    location: &TableLocation,
    events: I,
    options: WriteOptions,
) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Event>,
{
    let mut writer = ClusterTreeWriter::create(path, location, options)?;
    for event in events {
        writer.append_event(event)?;
    }
    writer.finish()
}

fn create_extendable_dataset<T: H5Type>(
    group: &Group,
    name: &str,
    chunk_values: usize,
    compression: Option<u8>,
    shuffle: bool,
) -> Result<Dataset> {
    let mut builder = group
        .new_dataset::<T>()
        .shape((0..,))
        .chunk((chunk_values.max(1),));

    if let Some(level) = compression {
        builder = builder.deflate(level);
    }

    if shuffle {
        builder = builder.shuffle();
    }

    Ok(builder.create(name)?)
}

fn append_slice<T: H5Type>(dataset: &Dataset, offset: usize, data: &[T]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    let new_len = offset + data.len();
    dataset.resize((new_len,))?;
    let view = ArrayView1::from(data);
    dataset.write_slice(view, s![offset..new_len])?;
    Ok(())
}

fn set_attr_str_file(file: &File, name: &str, value: &str) -> Result<()> {
    let value = VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))?;
    file.new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn read_dataset_vec_opt<T: H5Type>(group: &Group, name: &str) -> Result<Option<Vec<T>>> {
    match group.dataset(name) {
        Ok(dataset) => Ok(Some(dataset.read_raw::<T>()?)),
        Err(_) => Ok(None),
    }
}

fn read_attr_opt<T: H5Type + Clone>(group: &Group, name: &str) -> Result<Option<T>> {
    match group.attr(name) {
        Ok(attr) => Ok(Some(attr.read_scalar::<T>()?)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_column_offsets_validated() {
        let file = NamedTempFile::new().unwrap();
        {
            let h5 = File::create(file.path()).unwrap();
            let group = h5.create_group("ana").unwrap().create_group("ClusterTree").unwrap();
            let options = WriteOptions::default();
            let values = create_extendable_dataset::<f32>(&group, "Y", 4, None, false).unwrap();
            append_slice(&values, 0, &[1.0f32, 2.0]).unwrap();
            let index =
                create_extendable_dataset::<u64>(&group, "Y_index", options.chunk_values, None, false)
                    .unwrap();
            append_slice(&index, 0, &[0u64, 2, 1]).unwrap();
        }
        let input = ClusterFile::open(file.path()).unwrap();
        assert!(matches!(
            input.table(&TableLocation::default()),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_values_without_index_rejected() {
        let file = NamedTempFile::new().unwrap();
        {
            let h5 = File::create(file.path()).unwrap();
            let group = h5.create_group("ana").unwrap().create_group("ClusterTree").unwrap();
            let values = create_extendable_dataset::<f32>(&group, "Z", 4, None, false).unwrap();
            append_slice(&values, 0, &[1.0f32]).unwrap();
        }
        let input = ClusterFile::open(file.path()).unwrap();
        assert!(matches!(
            input.table(&TableLocation::default()),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_gap_read_back_as_absent() {
        let file = NamedTempFile::new().unwrap();
        let events = vec![
            Event::with_base(vec![1.0], vec![2.0], vec![3.0]),
            Event::with_base(vec![1.0], vec![2.0], vec![3.0])
                .with_column(Field::EnergyCollection, vec![4.0]),
        ];
        write_cluster_tree(
            file.path(),
            &TableLocation::default(),
            &events,
            WriteOptions::default(),
        )
        .unwrap();

        let input = ClusterFile::open(file.path()).unwrap();
        let table = input.table(&TableLocation::default()).unwrap();
        let read = table.read_rows(0..2).unwrap();
        assert_eq!(read, events);
        assert_eq!(read[0].column(Field::EnergyCollection), None);
    }

    #[test]
    fn test_missing_base_field_stays_defective() {
        let file = NamedTempFile::new().unwrap();
        let mut broken = Event::with_base(vec![1.0], vec![2.0], vec![3.0]);
        broken.set_column(Field::Z, None);
        let events = vec![
            Event::with_base(vec![1.0], vec![2.0], vec![3.0]),
            broken,
            Event::with_base(vec![4.0, 5.0], vec![6.0, 7.0], vec![8.0, 9.0]),
        ];
        write_cluster_tree(
            file.path(),
            &TableLocation::default(),
            &events,
            WriteOptions::default(),
        )
        .unwrap();

        let input = ClusterFile::open(file.path()).unwrap();
        let table = input.table(&TableLocation::default()).unwrap();
        let read = table.read_rows(0..3).unwrap();
        assert_eq!(read, events);
        assert!(read[1].clusters().is_err());
        assert_eq!(read[2].clusters().unwrap().count(), 2);
    }

    #[test]
    fn test_index_without_mask_is_fully_present() {
        let file = NamedTempFile::new().unwrap();
        {
            let h5 = File::create(file.path()).unwrap();
            let group = h5.create_group("ana").unwrap().create_group("ClusterTree").unwrap();
            let values = create_extendable_dataset::<f32>(&group, "Y", 4, None, false).unwrap();
            append_slice(&values, 0, &[1.0f32, 2.0]).unwrap();
            let index = create_extendable_dataset::<u64>(&group, "Y_index", 4, None, false).unwrap();
            append_slice(&index, 0, &[0u64, 0]).unwrap();
        }
        let input = ClusterFile::open(file.path()).unwrap();
        let table = input.table(&TableLocation::default()).unwrap();
        assert!(table.has_field(Field::Y));
        let read = table.read_rows(0..2).unwrap();
        assert_eq!(read[0].column(Field::Y), Some(&[][..]));
        assert_eq!(read[1].column(Field::Y), Some(&[1.0f32, 2.0][..]));
    }

    #[test]
    fn test_mask_length_validated() {
        let file = NamedTempFile::new().unwrap();
        {
            let h5 = File::create(file.path()).unwrap();
            let group = h5.create_group("ana").unwrap().create_group("ClusterTree").unwrap();
            let values = create_extendable_dataset::<f32>(&group, "Y", 4, None, false).unwrap();
            append_slice(&values, 0, &[1.0f32]).unwrap();
            let index = create_extendable_dataset::<u64>(&group, "Y_index", 4, None, false).unwrap();
            append_slice(&index, 0, &[0u64]).unwrap();
            let mask = create_extendable_dataset::<u8>(&group, "Y_present", 4, None, false).unwrap();
            append_slice(&mask, 0, &[1u8, 1]).unwrap();
        }
        let input = ClusterFile::open(file.path()).unwrap();
        assert!(matches!(
            input.table(&TableLocation::default()),
            Err(Error::InvalidFormat(_))
        ));
    }
}
