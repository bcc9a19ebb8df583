//! Printer golden tests: normalized sources must round-trip through
//! parse + print unchanged.

use trygo_parser::ast::{AstArena, Interner};
use trygo_parser::{parse_file, print_file};

fn roundtrip(src: &str) -> String {
    let mut arena = AstArena::new();
    let mut interner = Interner::new();
    let file = parse_file(src, 0, &mut arena, &mut interner)
        .unwrap_or_else(|d| panic!("parse failed: {} at {:?}", d.message, d.span));
    print_file(&file, &arena, &interner)
}

#[track_caller]
fn assert_fixed_point(src: &str) {
    assert_eq!(roundtrip(src), src);
}

#[test]
fn declarations_and_types() {
    assert_fixed_point(
        "package sample

import (
	\"fmt\"
)

type Point struct {
	X int
	Y int
}

type Reader interface {
	Read(p []byte) (int, error)
}

type Handler func(int) error

var registry map[string]Point

func add(a, b int) int {
	return a + b
}
",
    );
}

#[test]
fn statements_and_control_flow() {
    assert_fixed_point(
        "package sample

func run(xs []int, m map[string]int) {
	p := Point{X: 1, Y: 2}
	for i, x := range xs {
		process(i, x, m)
	}
	if p.X > 0 {
		process(p)
	} else {
		process(\"neg\")
	}
	switch p.X {
	case 1:
		process(\"one\")
	default:
		process(\"other\")
	}
}
",
    );
}

#[test]
fn channels_select_and_defer() {
    assert_fixed_point(
        "package sample

func pump(ch chan int, done <-chan bool) {
	defer close(ch)
	for {
		select {
		case ch <- 1:
		case <-done:
			return
		default:
		}
	}
}
",
    );
}

#[test]
fn function_literals_and_calls() {
    assert_fixed_point(
        "package sample

func wrap(f func(int) error) error {
	g := func(n int) error {
		return f(n + 1)
	}
	return g(41)
}
",
    );
}

#[test]
fn methods_and_pointers() {
    assert_fixed_point(
        "package sample

type Server struct {
	addr string
}

func (s *Server) Addr() string {
	return s.addr
}

func (s *Server) Reset() {
	s.addr = \"\"
}
",
    );
}

#[test]
fn go_and_labels() {
    assert_fixed_point(
        "package sample

func spin(n int) {
	go spin(n - 1)
loop:
	for i := 0; i < n; i++ {
		if i == 2 {
			break loop
		}
	}
}
",
    );
}

#[test]
fn empty_bodies_and_singleton_results() {
    assert_fixed_point(
        "package sample

func noop() {}

func one() int {
	return 1
}

func pair() (int, error) {
	return 1, nil
}
",
    );
}
