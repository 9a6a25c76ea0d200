mod lexer;

mod compiler_tests {
    use std::fs;

    use jack_core::{
        Build, BuildError, BuildOptions, CompileError, compile_source,
        driver::{collect_sources, output_path, read_source, write_unit},
    };

    const MAIN: &str = r#"
        /** Entry point: builds a square and moves it. */
        class Main {
            function void main() {
                var Square square;
                var int steps;
                let square = Square.new(0, 0, 30);
                let steps = 0;
                while (steps < 10) {
                    do square.moveRight();
                    let steps = steps + 1;
                }
                do Output.printString("done");
                do square.dispose();
                return;
            }
        }
    "#;

    const SQUARE: &str = r#"
        class Square {
            field int x, y; // top-left corner
            field int size;

            constructor Square new(int ax, int ay, int asize) {
                let x = ax;
                let y = ay;
                let size = asize;
                do draw();
                return this;
            }

            method void dispose() {
                do Memory.deAlloc(this);
                return;
            }

            method void draw() {
                do Screen.drawRectangle(x, y, x + size, y + size);
                return;
            }

            method void moveRight() {
                if ((x + size) < 510) {
                    let x = x + 2;
                    do draw();
                }
                return;
            }
        }
    "#;

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_two_unit_program() {
        let units = Build::new(BuildOptions::default())
            .add_source("Main.jack", MAIN)
            .add_source("Square.jack", SQUARE)
            .compile()
            .expect("program should compile");

        let main = units[0].to_vm_text();
        assert_eq!(
            lines(&main)[..8],
            [
                "function Main.main 2",
                "push constant 0",
                "push constant 0",
                "push constant 30",
                "call Square.new 3",
                "pop local 0",
                "push constant 0",
                "pop local 1",
            ]
        );
        assert!(main.contains("push local 0\ncall Square.moveRight 1\npop temp 0\n"));
        assert!(main.contains("push constant 4\ncall String.new 1\npush constant 100\n"));
        assert!(main.ends_with("call Square.dispose 1\npop temp 0\npush constant 0\nreturn\n"));

        let square = units[1].to_vm_text();
        assert_eq!(
            lines(&square)[..5],
            [
                "function Square.new 0",
                "push constant 3",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push argument 0",
            ]
        );
        // unqualified call to a method passes the current object
        assert!(square.contains("push pointer 0\ncall Square.draw 1\npop temp 0\n"));
        assert!(square.contains("function Square.moveRight 0\npush argument 0\npop pointer 0\n"));
        assert!(square.contains("push this 0\npush constant 2\nadd\npop this 0\n"));
    }

    #[test]
    fn test_instruction_stream_for_method() {
        let units = Build::new(BuildOptions::default())
            .add_source("Square.jack", SQUARE)
            .compile()
            .expect("unit should compile");

        let text = units[0].to_vm_text();
        let start = text
            .find("function Square.moveRight 0")
            .expect("moveRight is compiled");

        assert_eq!(
            lines(&text[start..]),
            vec![
                "function Square.moveRight 0",
                "push argument 0",
                "pop pointer 0",
                "push this 0",
                "push this 2",
                "add",
                "push constant 510",
                "lt",
                "if-goto IF_TRUE0",
                "goto IF_FALSE0",
                "label IF_TRUE0",
                "push this 0",
                "push constant 2",
                "add",
                "pop this 0",
                "push pointer 0",
                "call Square.draw 1",
                "pop temp 0",
                "goto IF_END0",
                "label IF_FALSE0",
                "label IF_END0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_standalone_unit() {
        let code = compile_source(
            "class Sum {
                function int of(Array a, int n) {
                    var int i, total;
                    while (i < n) { let total = total + a[i]; let i = i + 1; }
                    return total;
                }
            }",
        )
        .expect("unit should compile");

        let text = code.iter().map(|i| i.to_string()).collect::<Vec<_>>();
        assert_eq!(text[0], "function Sum.of 2");
        assert!(text.contains(&"pop pointer 1".to_string()));
        assert!(text.contains(&"push that 0".to_string()));
        assert_eq!(text.last().map(String::as_str), Some("return"));
    }

    #[test]
    fn test_long_expression_builds() {
        let terms = 10_000;
        let sum = vec!["1"; terms].join(" + ");
        let source = format!("class Long {{ function int sum() {{ return {}; }} }}", sum);

        let units = Build::new(BuildOptions::default())
            .add_source("Long.jack", source)
            .compile()
            .expect("long expression should compile");

        let code = &units[0].instructions;
        // function, every push, every add, return
        assert_eq!(code.len(), 1 + terms + (terms - 1) + 1);
        assert_eq!(code[terms].to_string(), "push constant 1");
        assert_eq!(code[terms + 1].to_string(), "add");
        assert_eq!(code[code.len() - 1].to_string(), "return");
    }

    #[test]
    fn test_build_fails_on_first_bad_unit() {
        let err = Build::new(BuildOptions::default())
            .add_source("Main.jack", "class Main { function void main() { let q = 1; return; } }")
            .add_source("Square.jack", SQUARE)
            .compile()
            .expect_err("q is undeclared");

        match err {
            BuildError::Unit { unit, source } => {
                assert_eq!(unit, "Main.jack");
                assert_eq!(source.code(), 2);
                assert!(matches!(source, CompileError::UnresolvedSymbol { .. }));
            }
            other => panic!("Expected unit error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_unit_names_rejected() {
        let err = Build::new(BuildOptions::default())
            .add_source("A.jack", SQUARE)
            .add_source("B.jack", SQUARE)
            .compile()
            .expect_err("Square is defined twice");

        assert!(matches!(
            err,
            BuildError::Unit { ref unit, source: CompileError::DuplicateSymbol { .. } } if unit == "B.jack"
        ));
    }

    #[test]
    fn test_directory_build_writes_vm_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = tempfile::tempdir().expect("out dir");
        fs::write(dir.path().join("Main.jack"), MAIN).expect("write main");
        fs::write(dir.path().join("Square.jack"), SQUARE).expect("write square");

        let sources = collect_sources(dir.path()).expect("sources");
        let mut build = Build::new(BuildOptions::default());
        for source in &sources {
            build.add_source(
                source.display().to_string(),
                read_source(source).expect("read"),
            );
        }
        let units = build.compile().expect("build");

        for (source, unit) in sources.iter().zip(&units) {
            write_unit(&output_path(source, Some(out.path())), unit).expect("write unit");
        }

        let main = fs::read_to_string(out.path().join("Main.vm")).expect("Main.vm");
        let square = fs::read_to_string(out.path().join("Square.vm")).expect("Square.vm");
        assert!(main.starts_with("function Main.main 2\n"));
        assert!(square.starts_with("function Square.new 0\n"));
        assert!(!dir.path().join("Main.vm").exists());
    }
}
