//! Lua VM hardening applied before any job script runs.
//!
//! Job scripts are ordinary host-supplied code, but they execute on a
//! worker thread inside the host process, so the VM is stripped of the
//! escape hatches that could take the whole process down with them.

use mlua::prelude::*;

/// Strip process-level escape hatches from the VM.
///
/// Removed:
/// - `package.loadlib` and `package.cpath` — no C extension loading
/// - `os.exit` — a script must not terminate the host process
///
/// The rest of the standard library stays available; scripts are trusted
/// with computation, not with process control.
pub fn harden(lua: &Lua) -> LuaResult<()> {
    lua.load(
        r#"
        package.loadlib = nil
        package.cpath = ''
        os.exit = nil
    "#,
    )
    .exec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harden_removes_loadlib() {
        let lua = Lua::new();
        harden(&lua).unwrap();

        let loadlib: LuaValue = lua
            .globals()
            .get::<LuaTable>("package")
            .unwrap()
            .get("loadlib")
            .unwrap();
        assert_eq!(loadlib, LuaValue::Nil);
    }

    #[test]
    fn test_harden_clears_cpath() {
        let lua = Lua::new();
        harden(&lua).unwrap();

        let cpath: String = lua
            .globals()
            .get::<LuaTable>("package")
            .unwrap()
            .get("cpath")
            .unwrap();
        assert_eq!(cpath, "");
    }

    #[test]
    fn test_harden_removes_os_exit() {
        let lua = Lua::new();
        harden(&lua).unwrap();

        let exit: LuaValue = lua
            .globals()
            .get::<LuaTable>("os")
            .unwrap()
            .get("exit")
            .unwrap();
        assert_eq!(exit, LuaValue::Nil);
    }

    #[test]
    fn test_harden_keeps_computation_libs() {
        let lua = Lua::new();
        harden(&lua).unwrap();

        let upper: String = lua.load("string.upper('abc')").eval().unwrap();
        assert_eq!(upper, "ABC");

        let joined: String = lua
            .load("table.concat({'x', 'y'}, '-')")
            .eval()
            .unwrap();
        assert_eq!(joined, "x-y");
    }
}
