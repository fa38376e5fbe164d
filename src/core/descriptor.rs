//! # Module Descriptors / 模块描述符
//!
//! Decides whether compiled outputs form a named module, and which one. Only
//! the compiled `module-info.class` counts, since it is the only descriptor
//! the runtime reads. `module-info.java` is read for reporting alone.
//!
//! 判断编译输出是否构成命名模块以及模块名称。只有编译后的 `module-info.class` 有效，
//! 因为运行时只读取它。`module-info.java` 仅用于报告。

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

use crate::core::target::is_qualified_name;

pub const CLASS_DESCRIPTOR: &str = "module-info.class";
pub const SOURCE_DESCRIPTOR: &str = "module-info.java";

const CLASS_MAGIC: u32 = 0xCAFE_BABE;
const ACC_MODULE: u16 = 0x8000;

/// Returns the module declared by the first `module-info.class` found in
/// `class_dirs`.
pub fn find_compiled_module(class_dirs: &[PathBuf]) -> Result<Option<String>> {
    for dir in class_dirs {
        let descriptor = dir.join(CLASS_DESCRIPTOR);
        if descriptor.is_file() {
            let bytes = fs::read(&descriptor)
                .with_context(|| format!("Failed to read {}", descriptor.display()))?;
            return read_class_module_name(&bytes)
                .with_context(|| format!("Malformed module descriptor {}", descriptor.display()));
        }
    }
    Ok(None)
}

/// Returns the module declared by `module-info.java` in `source_roots`.
pub fn find_source_module(source_roots: &[PathBuf]) -> Result<Option<String>> {
    for root in source_roots {
        let descriptor = root.join(SOURCE_DESCRIPTOR);
        if descriptor.is_file() {
            let source = fs::read_to_string(&descriptor)
                .with_context(|| format!("Failed to read {}", descriptor.display()))?;
            return Ok(read_source_module_name(&source));
        }
    }
    Ok(None)
}

enum Constant {
    Utf8(String),
    Module(u16),
    Other,
    /// Second slot taken by `long` and `double` constants.
    Unusable,
}

struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        if end > self.bytes.len() {
            bail!("truncated class file at offset {}", self.pos);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u1(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u2(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u4(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip_members(&mut self) -> Result<()> {
        let count = self.u2()?;
        for _ in 0..count {
            // access_flags, name_index, descriptor_index
            self.take(6)?;
            self.skip_attributes()?;
        }
        Ok(())
    }

    fn skip_attributes(&mut self) -> Result<()> {
        let count = self.u2()?;
        for _ in 0..count {
            self.u2()?;
            let len = self.u4()? as usize;
            self.take(len)?;
        }
        Ok(())
    }
}

fn read_constant_pool(reader: &mut ClassReader<'_>) -> Result<Vec<Constant>> {
    let count = reader.u2()? as usize;
    // Index 0 is unused by the class file format.
    let mut pool = vec![Constant::Unusable];

    while pool.len() < count {
        let tag = reader.u1()?;
        match tag {
            1 => {
                let len = reader.u2()? as usize;
                let raw = reader.take(len)?;
                pool.push(Constant::Utf8(String::from_utf8_lossy(raw).into_owned()));
            }
            19 => pool.push(Constant::Module(reader.u2()?)),
            3 | 4 => {
                reader.take(4)?;
                pool.push(Constant::Other);
            }
            5 | 6 => {
                reader.take(8)?;
                pool.push(Constant::Other);
                pool.push(Constant::Unusable);
            }
            7 | 8 | 16 | 20 => {
                reader.take(2)?;
                pool.push(Constant::Other);
            }
            9 | 10 | 11 | 12 | 17 | 18 => {
                reader.take(4)?;
                pool.push(Constant::Other);
            }
            15 => {
                reader.take(3)?;
                pool.push(Constant::Other);
            }
            other => bail!("unknown constant pool tag {other}"),
        }
    }

    Ok(pool)
}

fn utf8_at(pool: &[Constant], index: u16) -> Result<&str> {
    match pool.get(index as usize) {
        Some(Constant::Utf8(value)) => Ok(value),
        _ => bail!("constant #{index} is not a UTF-8 entry"),
    }
}

/// Extracts the module name from the bytes of a compiled `module-info.class`.
///
/// Returns `Ok(None)` for a well-formed class file that is not a module
/// descriptor.
///
/// 从编译后的 `module-info.class` 字节中提取模块名。
pub fn read_class_module_name(bytes: &[u8]) -> Result<Option<String>> {
    let mut reader = ClassReader::new(bytes);
    if reader.u4()? != CLASS_MAGIC {
        bail!("not a class file");
    }
    // minor_version, major_version
    reader.take(4)?;
    let pool = read_constant_pool(&mut reader)?;

    let access_flags = reader.u2()?;
    if access_flags & ACC_MODULE == 0 {
        return Ok(None);
    }
    // this_class, super_class
    reader.take(4)?;
    let interfaces = reader.u2()? as usize;
    reader.take(interfaces * 2)?;
    reader.skip_members()?;
    reader.skip_members()?;

    let attributes = reader.u2()?;
    for _ in 0..attributes {
        let name_index = reader.u2()?;
        let len = reader.u4()? as usize;
        let body = reader.take(len)?;
        if utf8_at(&pool, name_index)? != "Module" {
            continue;
        }
        let mut body = ClassReader::new(body);
        let module_index = body.u2()?;
        let name_index = match pool.get(module_index as usize) {
            Some(Constant::Module(name_index)) => *name_index,
            _ => bail!("constant #{module_index} is not a module entry"),
        };
        // Module names are stored in internal form, which is already dotted.
        return Ok(Some(utf8_at(&pool, name_index)?.to_string()));
    }

    Ok(None)
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Extracts the module name declared by a `module-info.java` source.
/// 从 `module-info.java` 源码中提取声明的模块名。
pub fn read_source_module_name(source: &str) -> Option<String> {
    let cleaned = strip_comments(source).replace('{', " { ");
    let mut tokens = cleaned.split_whitespace();

    while let Some(token) = tokens.next() {
        if token == "module" {
            return tokens
                .next()
                .filter(|name| is_qualified_name(name))
                .map(str::to_string);
        }
        // Only annotations, imports and `open` may precede the declaration.
        if token == "{" {
            return None;
        }
    }

    None
}
