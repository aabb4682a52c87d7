//! Source fixtures shared across integration tests.

use once_cell::sync::Lazy;

pub const PROJECT_ROOT: &str = "/project";

pub const FIRST_FILE: &str = "// first
export function abc(): void {}
export function dummy(): void {}
export class Foo {
    bar(): void {}
}
";

pub const SECOND_FILE: &str = "import { abc, dummy } from \"./firstFile\";
abc();
dummy();
abc();
abc();
";

pub const THIRD_FILE: &str = "import { abc, Foo } from \"./firstFile\";
abc();
let foo = new Foo();
foo.bar();
abc();
if (true) {
    abc();
}
";

/// Offset of the `abc` declaration in the first file.
pub const ABC_DECLARATION: u32 = 25;

/// The three-file rename project, keyed by absolute path.
pub static RENAME_PROJECT: Lazy<Vec<(String, &'static str)>> = Lazy::new(|| {
    vec![
        (format!("{PROJECT_ROOT}/firstFile.ets"), FIRST_FILE),
        (format!("{PROJECT_ROOT}/secondFile.ets"), SECOND_FILE),
        (format!("{PROJECT_ROOT}/thirdFile.ets"), THIRD_FILE),
    ]
});

/// An expected rename location: file name, start, end, line, prefix, suffix.
pub type ExpectedLocation = (String, u32, u32, u32, &'static str, &'static str);

/// Every use of `abc` in the second and third files, in source order.
pub static ABC_USES: Lazy<Vec<ExpectedLocation>> = Lazy::new(|| {
    let second = format!("{PROJECT_ROOT}/secondFile.ets");
    let third = format!("{PROJECT_ROOT}/thirdFile.ets");
    vec![
        (second.clone(), 9, 12, 0, "import { ", ", dummy } from \"./firstFile\";"),
        (second.clone(), 42, 45, 1, "", "();"),
        (second.clone(), 58, 61, 3, "", "();"),
        (second, 65, 68, 4, "", "();"),
        (third.clone(), 9, 12, 0, "import { ", ", Foo } from \"./firstFile\";"),
        (third.clone(), 40, 43, 1, "", "();"),
        (third.clone(), 79, 82, 4, "", "();"),
        (third, 102, 105, 6, "    ", "();"),
    ]
});

pub const SAFE_DELETE_SOURCE: &str = "function a(): Number { return 1; } a()\nexport const PI = 3.1415926;";

pub const STDLIB_MODULE: &str = "std/core";
pub const STDLIB_PATH: &str = "/sdk/stdlib/std/core/Console.ets";
pub const STDLIB_SOURCE: &str = "export function print(message: string): void {}
export function println(message: string): void {}
export class Console {
    log(message: string): void {}
}
";
