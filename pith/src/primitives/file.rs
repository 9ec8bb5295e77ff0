use std::path::PathBuf;

use super::inputs;
use crate::{ExecutionResult, PithError, PrimitiveContext, Value};

fn path_arg(ctx: &PrimitiveContext, value: Value) -> ExecutionResult<PathBuf> {
    ctx.string(value).map(PathBuf::from)
}

/// ( path -- contents|nil )
pub fn read(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [path] = inputs(ctx)?;
    let path = path_arg(ctx, path)?;
    let contents = match ctx.runtime.fs.read_file(&path) {
        Ok(contents) => Value::String(contents),
        Err(err) => {
            log::debug!("file-read {}: {err}", path.display());
            Value::Nil
        }
    };
    ctx.push(contents)
}

/// ( contents path -- )
pub fn write(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [contents, path] = inputs(ctx)?;
    let (contents, path) = (ctx.string(contents)?, path_arg(ctx, path)?);
    ctx.runtime
        .fs
        .write_file(&path, &contents)
        .map_err(|err| PithError::io(path.display(), &err))
}

/// ( contents path -- ), creating the file when missing
pub fn append(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [contents, path] = inputs(ctx)?;
    let (contents, path) = (ctx.string(contents)?, path_arg(ctx, path)?);
    let fs = &ctx.runtime.fs;
    let mut existing = if fs.exists(&path) {
        fs.read_file(&path)
            .map_err(|err| PithError::io(path.display(), &err))?
    } else {
        String::new()
    };
    existing.push_str(&contents);
    fs.write_file(&path, &existing)
        .map_err(|err| PithError::io(path.display(), &err))
}

pub fn exists(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [path] = inputs(ctx)?;
    let path = path_arg(ctx, path)?;
    let exists = ctx.runtime.fs.exists(&path);
    ctx.push(exists)
}

/// ( path -- names|nil )
pub fn dir_list(ctx: &mut PrimitiveContext) -> ExecutionResult {
    let [path] = inputs(ctx)?;
    let path = path_arg(ctx, path)?;
    let listing = match ctx.runtime.fs.list_dir(&path) {
        Ok(entries) => Value::Array(
            entries
                .iter()
                .filter_map(|entry| entry.file_name())
                .map(|name| Value::String(name.to_string_lossy().into_owned()))
                .collect(),
        ),
        Err(_) => Value::Nil,
    };
    ctx.push(listing)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::{ErrorKind, FileSystem, MemoryFileSystem, Runtime, Value};
    use pretty_assertions::assert_eq;

    fn runtime(fs: &MemoryFileSystem, body: &str) -> Runtime {
        let mut rt = Runtime::new(fs.clone());
        rt.load(&format!("main: {body} end")).unwrap();
        rt
    }

    #[test]
    fn write_append_read() {
        let fs = MemoryFileSystem::new();
        let mut rt = runtime(
            &fs,
            "\"a\" \"/t/x.txt\" file-write \"b\" \"/t/x.txt\" file-append \
             \"/t/x.txt\" file-read \"/t/none\" file-read \"/t/x.txt\" file-exists",
        );
        rt.run_named_slot("main").unwrap();
        assert_eq!(rt.stack(), &["ab".into(), Value::Nil, true.into()]);
        assert_eq!(fs.read_file(Path::new("/t/x.txt")).unwrap(), "ab");
    }

    #[test]
    fn dir_list_gives_names() {
        let fs = MemoryFileSystem::with_files([("/d/a.pith", ""), ("/d/b.txt", "")]);
        let mut rt = runtime(&fs, "\"/d\" dir-list \"/nope\" dir-list");
        rt.run_named_slot("main").unwrap();
        assert_eq!(
            rt.stack(),
            &[
                Value::Array(vec!["a.pith".into(), "b.txt".into()]),
                Value::Nil
            ]
        );
    }

    #[test]
    fn write_needs_strings() {
        let fs = MemoryFileSystem::new();
        let mut rt = runtime(&fs, "1 \"/x\" file-write");
        assert_eq!(rt.run_named_slot("main").unwrap_err().kind(), ErrorKind::Type);
    }
}
